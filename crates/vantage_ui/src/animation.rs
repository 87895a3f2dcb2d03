//! Tick-driven per-widget animation state machine.
//!
//! IDLE → RUNNING → (STOPPING) → IDLE. The host tick advances a tick
//! counter; every `ticks_per_frame` ticks the frame counter moves, and on
//! wrapping past `frame_count` the machine either repeats or falls back to
//! idle. All of it is plain counters so the whole state fits in the widget
//! envelope.

use crate::error::UiError;
use crate::widget::WidgetKind;

/// Animation kinds with stable wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AnimKind {
    /// No animation configured.
    #[default]
    None = 0,
    /// Slide along the x axis.
    OffsetX = 1,
    /// Slide along the y axis.
    OffsetY = 2,
    /// Animate the width.
    Width = 3,
    /// Animate the height.
    Height = 4,
    /// Fade the drawn content.
    Alpha = 5,
}

impl AnimKind {
    /// Returns the stable wire id.
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Looks an animation kind up by wire id.
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::OffsetX),
            2 => Some(Self::OffsetY),
            3 => Some(Self::Width),
            4 => Some(Self::Height),
            5 => Some(Self::Alpha),
            _ => None,
        }
    }

    /// Whether this animation kind can drive the given widget kind.
    ///
    /// Geometry animations apply to everything; alpha fades need drawn
    /// content, which bare frames and containers do not have.
    #[must_use]
    pub const fn supports(self, widget: WidgetKind) -> bool {
        match self {
            Self::None | Self::OffsetX | Self::OffsetY | Self::Width | Self::Height => true,
            Self::Alpha => matches!(widget, WidgetKind::Label | WidgetKind::Button),
        }
    }
}

/// Animation flag bits, packed into one wire byte.
pub mod anim_flags {
    /// Restart from frame 0 after the last frame.
    pub const REPEAT: u8 = 1 << 0;
    /// Reset the widget to its pre-animation state when stopping.
    pub const RESET: u8 = 1 << 1;
    /// The machine is currently advancing.
    pub const RUNNING: u8 = 1 << 2;
    /// Finish the current cycle, then stop.
    pub const STOPPING: u8 = 1 << 3;
}

/// Complete animation state carried by every widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimState {
    /// Configured animation kind.
    pub kind: AnimKind,
    /// Target value for the animated property.
    pub value: f32,
    /// Number of frames in one cycle.
    pub frame_count: u16,
    /// Host ticks per frame advance.
    pub ticks_per_frame: u16,
    /// REPEAT/RESET/RUNNING/STOPPING bits.
    pub flags: u8,
    /// Transient tick counter, not synced.
    pub tick: u32,
    /// Transient frame counter, not synced.
    pub frame: u32,
}

impl AnimState {
    /// Creates the idle state with no animation configured.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            kind: AnimKind::None,
            value: 1.0,
            frame_count: 0,
            ticks_per_frame: 20,
            flags: 0,
            tick: 0,
            frame: 0,
        }
    }

    /// Whether the machine is currently running.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.flags & anim_flags::RUNNING != 0
    }

    /// Configures a new animation; counters restart from zero.
    ///
    /// # Errors
    ///
    /// [`UiError::AnimationUnsupported`] if the kind cannot drive the given
    /// widget kind.
    pub fn configure(
        &mut self,
        widget: WidgetKind,
        kind: AnimKind,
        value: f32,
        frame_count: u16,
        ticks_per_frame: u16,
        repeat: bool,
        reset: bool,
    ) -> Result<(), UiError> {
        if !kind.supports(widget) {
            return Err(UiError::AnimationUnsupported { kind, widget });
        }
        self.kind = kind;
        self.value = value;
        self.frame_count = frame_count;
        self.ticks_per_frame = ticks_per_frame;
        self.flags = (if repeat { anim_flags::REPEAT } else { 0 })
            | (if reset { anim_flags::RESET } else { 0 });
        self.tick = 0;
        self.frame = 0;
        Ok(())
    }

    /// Starts the machine. No-op when no animation is configured.
    ///
    /// Returns whether a sync-relevant change was made.
    pub fn start(&mut self) -> bool {
        if self.kind == AnimKind::None {
            return false;
        }
        self.flags |= anim_flags::RUNNING;
        true
    }

    /// Stops the machine.
    ///
    /// With `finish` set a running animation completes its current cycle
    /// first (STOPPING); otherwise it halts immediately.
    pub fn stop(&mut self, finish: bool) {
        if self.is_running() && finish {
            self.flags |= anim_flags::STOPPING;
        } else {
            self.flags &= !anim_flags::RUNNING;
        }
    }

    /// Advances one host tick.
    pub fn advance(&mut self) {
        if !self.is_running() || self.ticks_per_frame == 0 {
            return;
        }
        self.tick = self.tick.wrapping_add(1);
        if self.tick % u32::from(self.ticks_per_frame) != 0 {
            return;
        }
        // Running, and due for the next frame.
        self.frame += 1;
        if self.frame == u32::from(self.frame_count) {
            self.frame = 0;
            if self.flags & anim_flags::STOPPING != 0 || self.flags & anim_flags::REPEAT == 0 {
                self.flags &= !anim_flags::RUNNING;
            }
        }
    }
}

impl Default for AnimState {
    fn default() -> Self {
        Self::idle()
    }
}
