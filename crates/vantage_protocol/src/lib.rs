//! # VANTAGE Protocol
//!
//! Incremental sync codec for the widget model:
//! - Packed sign-magnitude integers (1-5 bytes)
//! - Length-prefixed strings and raw RGBA colors
//! - Per-widget envelope records with an additive schema-version chain
//! - Dirty-attribute diffs with tombstone deletion markers
//! - A snapshot-and-clear session layer feeding the transport
//!
//! The crate produces and consumes byte packets only; moving them over
//! a socket is the host's concern.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod codec;
pub mod diff;
pub mod envelope;
pub mod error;
pub mod session;

pub use codec::{packed_len, ByteReader, ByteWriter, MAX_STRING_LEN};
pub use diff::{decode_diff, decode_diff_with_limit, encode_diff};
pub use envelope::{KindExtras, WidgetRecord};
pub use error::DecodeError;
pub use session::SyncSession;
