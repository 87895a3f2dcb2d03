//! Typed per-widget attribute store with per-key dirty tracking.
//!
//! Every key declares its value type in a compile-time table, so writes are
//! checked at the call site instead of via runtime reflection. Absent keys
//! fall back to the key's declared default. The dirty set feeds the diff
//! serializer: present keys are sent as ordinal + value, cleared keys as a
//! tombstone (see `vantage_protocol`).

use crate::error::UiError;
use crate::style::Color;

/// The value type an attribute key declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// A signed integer, packed on the wire.
    Int,
    /// A text value, length-prefixed on the wire.
    Str,
    /// An RGBA color, 4 raw bytes on the wire.
    Color,
    /// A reference to an owning plugin, sent as its packed name.
    OwnerRef,
}

/// Widget attribute keys with stable wire ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttrKey {
    /// Display text of the widget.
    Text = 0,
    /// Foreground text color.
    TextColor = 1,
    /// Fill color behind the widget.
    BackgroundColor = 2,
    /// Border color around the widget.
    BorderColor = 3,
    /// Integer text scale multiplier.
    TextScale = 4,
    /// The plugin that owns this widget's content.
    Owner = 5,
    /// Keyboard shortcut slot bound to the widget.
    Hotkey = 6,
    /// Short badge/overlay text.
    Badge = 7,
}

impl AttrKey {
    /// All keys in ordinal order.
    pub const ALL: [Self; 8] = [
        Self::Text,
        Self::TextColor,
        Self::BackgroundColor,
        Self::BorderColor,
        Self::TextScale,
        Self::Owner,
        Self::Hotkey,
        Self::Badge,
    ];

    /// Number of declared keys.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the stable wire ordinal.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks a key up by wire ordinal.
    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    /// The value type this key declares.
    #[must_use]
    pub const fn kind(self) -> AttrKind {
        match self {
            Self::Text | Self::Badge => AttrKind::Str,
            Self::TextColor | Self::BackgroundColor | Self::BorderColor => AttrKind::Color,
            Self::TextScale | Self::Hotkey => AttrKind::Int,
            Self::Owner => AttrKind::OwnerRef,
        }
    }

    /// The declared default, if the key has one.
    #[must_use]
    pub fn default_value(self) -> Option<AttrValue> {
        match self {
            Self::Text | Self::Badge => Some(AttrValue::Str(String::new())),
            Self::TextColor => Some(AttrValue::Color(Color::WHITE)),
            Self::TextScale => Some(AttrValue::Int(1)),
            Self::BackgroundColor | Self::BorderColor | Self::Owner | Self::Hotkey => None,
        }
    }
}

/// A stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Integer value.
    Int(i32),
    /// Text value.
    Str(String),
    /// Color value.
    Color(Color),
    /// Owning-plugin reference, by name.
    OwnerRef(String),
}

impl AttrValue {
    /// The runtime type tag of this value.
    #[must_use]
    pub const fn kind(&self) -> AttrKind {
        match self {
            Self::Int(_) => AttrKind::Int,
            Self::Str(_) => AttrKind::Str,
            Self::Color(_) => AttrKind::Color,
            Self::OwnerRef(_) => AttrKind::OwnerRef,
        }
    }
}

/// Sparse store of attribute values plus the "dirty since last sync" set.
#[derive(Debug, Clone)]
pub struct AttributeStore {
    values: Vec<Option<AttrValue>>,
    dirty: u32,
}

impl AttributeStore {
    /// Creates an empty store; every `get` falls back to declared defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: vec![None; AttrKey::COUNT],
            dirty: 0,
        }
    }

    /// Sets a key, type-checked against the declared table.
    ///
    /// Writing the currently observed value is a no-op and does not mark
    /// the key dirty.
    ///
    /// # Errors
    ///
    /// [`UiError::AttrTypeMismatch`] if the value's type differs from the
    /// key's declaration.
    pub fn set(&mut self, key: AttrKey, value: AttrValue) -> Result<(), UiError> {
        if value.kind() != key.kind() {
            return Err(UiError::AttrTypeMismatch {
                key,
                expected: key.kind(),
                found: value.kind(),
            });
        }
        // Compare against the observable value so re-setting a default is
        // also a no-op.
        if self.get_owned(key, None).as_ref() == Some(&value) {
            return Ok(());
        }
        self.values[key.ordinal() as usize] = Some(value);
        self.dirty |= 1 << key.ordinal();
        Ok(())
    }

    /// Clears a key, producing a tombstone on the next sync.
    ///
    /// Clearing an absent key is a no-op.
    pub fn clear(&mut self, key: AttrKey) {
        if self.values[key.ordinal() as usize].take().is_some() {
            self.dirty |= 1 << key.ordinal();
        }
    }

    /// Returns the stored value, else the caller's `fallback`.
    ///
    /// Declared defaults are owned values; use [`AttributeStore::get_owned`]
    /// for the full stored → fallback → default chain.
    #[must_use]
    pub fn get<'a>(&'a self, key: AttrKey, fallback: Option<&'a AttrValue>) -> Option<&'a AttrValue> {
        self.values[key.ordinal() as usize].as_ref().or(fallback)
    }

    /// Returns the observable value: stored, else `fallback`, else default.
    #[must_use]
    pub fn get_owned(&self, key: AttrKey, fallback: Option<AttrValue>) -> Option<AttrValue> {
        self.values[key.ordinal() as usize]
            .clone()
            .or(fallback)
            .or_else(|| key.default_value())
    }

    /// Whether an explicit value is stored for the key.
    #[must_use]
    pub fn has(&self, key: AttrKey) -> bool {
        self.values[key.ordinal() as usize].is_some()
    }

    /// Whether any key changed since the last sync.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Number of dirty keys.
    #[must_use]
    pub const fn dirty_count(&self) -> u32 {
        self.dirty.count_ones()
    }

    /// Iterates the dirty keys in ordinal order.
    pub fn dirty_keys(&self) -> impl Iterator<Item = AttrKey> + '_ {
        AttrKey::ALL
            .into_iter()
            .filter(move |key| self.dirty & (1 << key.ordinal()) != 0)
    }

    /// Clears the dirty set after a sync pass.
    pub fn clear_dirty(&mut self) {
        self.dirty = 0;
    }

    /// Snapshot-and-clear: returns the dirty bitmask and resets it.
    pub fn take_dirty(&mut self) -> u32 {
        std::mem::take(&mut self.dirty)
    }

    /// Applies a decoded value without touching the dirty set.
    ///
    /// Used by the sync decoder: remote state must not be re-sent.
    ///
    /// # Errors
    ///
    /// [`UiError::AttrTypeMismatch`] if the value's type differs from the
    /// key's declaration.
    pub fn apply(&mut self, key: AttrKey, value: AttrValue) -> Result<(), UiError> {
        if value.kind() != key.kind() {
            return Err(UiError::AttrTypeMismatch {
                key,
                expected: key.kind(),
                found: value.kind(),
            });
        }
        self.values[key.ordinal() as usize] = Some(value);
        Ok(())
    }

    /// Removes a decoded tombstone without touching the dirty set.
    pub fn apply_clear(&mut self, key: AttrKey) {
        self.values[key.ordinal() as usize] = None;
    }

    /// Compares observable state with another store (`get` for all keys).
    #[must_use]
    pub fn observably_equal(&self, other: &Self) -> bool {
        AttrKey::ALL
            .into_iter()
            .all(|key| self.get_owned(key, None) == other.get_owned(key, None))
    }
}

impl Default for AttributeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_marks_dirty_once() {
        let mut store = AttributeStore::new();
        store.set(AttrKey::Text, AttrValue::Str("hp".into())).unwrap();
        assert_eq!(store.dirty_count(), 1);
        store.clear_dirty();

        // Same value again: no-op, stays clean.
        store.set(AttrKey::Text, AttrValue::Str("hp".into())).unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut store = AttributeStore::new();
        let err = store.set(AttrKey::TextScale, AttrValue::Str("2".into()));
        assert_eq!(
            err,
            Err(UiError::AttrTypeMismatch {
                key: AttrKey::TextScale,
                expected: AttrKind::Int,
                found: AttrKind::Str,
            })
        );
        // The store is untouched.
        assert!(!store.is_dirty());
        assert!(!store.has(AttrKey::TextScale));
    }

    #[test]
    fn test_default_fallback_chain() {
        let mut store = AttributeStore::new();
        assert_eq!(store.get_owned(AttrKey::TextScale, None), Some(AttrValue::Int(1)));
        assert_eq!(
            store.get_owned(AttrKey::TextScale, Some(AttrValue::Int(3))),
            Some(AttrValue::Int(3))
        );
        assert_eq!(store.get_owned(AttrKey::BorderColor, None), None);

        store.set(AttrKey::TextScale, AttrValue::Int(2)).unwrap();
        assert_eq!(
            store.get_owned(AttrKey::TextScale, Some(AttrValue::Int(3))),
            Some(AttrValue::Int(2))
        );
    }

    #[test]
    fn test_clear_is_dirty_only_when_present() {
        let mut store = AttributeStore::new();
        store.clear(AttrKey::Badge);
        assert!(!store.is_dirty());

        store.set(AttrKey::Badge, AttrValue::Str("!".into())).unwrap();
        store.clear_dirty();
        store.clear(AttrKey::Badge);
        assert!(store.is_dirty());
        assert_eq!(store.dirty_keys().collect::<Vec<_>>(), vec![AttrKey::Badge]);
    }

    #[test]
    fn test_take_dirty_snapshots_and_clears() {
        let mut store = AttributeStore::new();
        store.set(AttrKey::Text, AttrValue::Str("hp".into())).unwrap();
        store.set(AttrKey::Hotkey, AttrValue::Int(4)).unwrap();
        let mask = store.take_dirty();
        assert_eq!(mask.count_ones(), 2);
        assert_ne!(mask & (1 << AttrKey::Text.ordinal()), 0);
        assert!(!store.is_dirty());
    }
}
