//! Error taxonomy for the widget model.
//!
//! These are programming errors in the caller, not recoverable runtime
//! conditions: the offending mutation is aborted and no applied state is
//! corrupted.

use crate::animation::AnimKind;
use crate::attr::{AttrKey, AttrKind};
use crate::widget::WidgetKind;

/// Errors raised by widget and attribute mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    /// A value of the wrong declared type was written to an attribute key.
    #[error("attribute {key:?} expects {expected:?}, got {found:?}")]
    AttrTypeMismatch {
        /// The attribute key being written.
        key: AttrKey,
        /// The type the key declares.
        expected: AttrKind,
        /// The type of the rejected value.
        found: AttrKind,
    },

    /// An animation kind was applied to a widget kind that does not support it.
    #[error("animation {kind:?} is not supported by {widget:?} widgets")]
    AnimationUnsupported {
        /// The rejected animation kind.
        kind: AnimKind,
        /// The widget kind it was applied to.
        widget: WidgetKind,
    },

    /// A static widget id outside the reserved range was requested.
    #[error("static widget ids must be below {max}, got {0}", max = crate::tree::FIRST_DYNAMIC_ID)]
    StaticIdRange(
        /// The rejected id.
        u32,
    ),

    /// A static widget id is already occupied.
    #[error("static widget id {0} is already in use")]
    StaticIdTaken(
        /// The occupied id.
        u32,
    ),

    /// A child was attached to a widget that owns no child list.
    #[error("widget {0} is not a container")]
    NotAContainer(
        /// The offending parent id.
        u32,
    ),
}
