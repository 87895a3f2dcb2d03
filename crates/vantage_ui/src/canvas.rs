//! The fixed virtual canvas all widget coordinates live in.
//!
//! Widget geometry is expressed in logical units on a small fixed
//! resolution, independent of actual screen pixels. The remote client
//! scales it to the real framebuffer.

/// Default virtual canvas width in logical units.
pub const DEFAULT_CANVAS_WIDTH: i32 = 427;

/// Default virtual canvas height in logical units.
pub const DEFAULT_CANVAS_HEIGHT: i32 = 240;

/// The logical resolution used to clamp widget bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    /// Canvas width in logical units.
    pub width: i32,
    /// Canvas height in logical units.
    pub height: i32,
}

impl Canvas {
    /// Creates a canvas with explicit dimensions.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Clamps an aggregate minimum extent to the canvas.
    #[must_use]
    pub fn clamp_min(&self, value: i32, horizontal: bool) -> i32 {
        let limit = if horizontal { self.width } else { self.height };
        value.clamp(0, limit)
    }

    /// Clamps an aggregate maximum extent to the canvas.
    ///
    /// A zero maximum means "unconstrained" and widens to the full canvas,
    /// matching the legacy wire semantics.
    #[must_use]
    pub fn clamp_max(&self, value: i32, horizontal: bool) -> i32 {
        let limit = if horizontal { self.width } else { self.height };
        if value <= 0 {
            limit
        } else {
            value.min(limit)
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_max_widens_to_canvas() {
        let canvas = Canvas::default();
        assert_eq!(canvas.clamp_max(0, true), 427);
        assert_eq!(canvas.clamp_max(0, false), 240);
        assert_eq!(canvas.clamp_max(100, true), 100);
        assert_eq!(canvas.clamp_max(9999, false), 240);
    }
}
