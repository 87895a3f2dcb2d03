//! Decode failure taxonomy.
//!
//! Encoding cannot fail; decoding surfaces every malformed input as an
//! explicit error so the transport can drop the packet and resync. The
//! codec never retries internally.

/// Errors raised while decoding a sync packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ended mid-field.
    #[error("unexpected end of packet")]
    UnexpectedEof,

    /// A string length prefix exceeded the configured maximum.
    #[error("string length {len} exceeds maximum {max}")]
    StringTooLong {
        /// The declared length.
        len: i32,
        /// The maximum the decoder accepts.
        max: i32,
    },

    /// A string length prefix was negative.
    #[error("string length {0} is negative")]
    NegativeLength(i32),

    /// String bytes were not valid text for the selected packing mode.
    #[error("string payload is not valid text")]
    InvalidText,

    /// An unknown widget kind id.
    #[error("unknown widget kind id {0}")]
    UnknownKind(u8),

    /// An unknown anchor id.
    #[error("unknown anchor id {0}")]
    UnknownAnchor(u8),

    /// An unknown render priority id.
    #[error("unknown render priority id {0}")]
    UnknownPriority(i32),

    /// An unknown animation kind id.
    #[error("unknown animation kind id {0}")]
    UnknownAnim(u8),

    /// An unknown layout mode id.
    #[error("unknown layout mode id {0}")]
    UnknownLayout(u8),

    /// An attribute ordinal outside the declared key table.
    #[error("unknown attribute ordinal {0}")]
    UnknownAttr(i32),

    /// A widget id outside the representable range.
    #[error("invalid widget id {0}")]
    InvalidWidgetId(i32),

    /// The sender's schema version for a widget kind does not match ours.
    #[error("wire version {found} for kind {kind:?} does not match expected {expected}")]
    VersionMismatch {
        /// The widget kind whose record was being decoded.
        kind: vantage_ui::WidgetKind,
        /// The version this build encodes.
        expected: u32,
        /// The version found on the wire.
        found: u32,
    },
}
