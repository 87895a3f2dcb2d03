//! # VANTAGE
//!
//! The host integration crate, tying the widget model to the sync codec.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        HOST SESSION                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌────────────────┐  tick  ┌────────────────┐   packets      │
//! │  │  vantage_ui    │───────>│ vantage_proto  │──────────────> │
//! │  │                │        │                │   transport    │
//! │  │  • widget tree │        │  • envelopes   │   (external)   │
//! │  │  • layout      │<───────│  • attr diffs  │<────────────── │
//! │  │  • attributes  │ apply  │  • packed ints │                │
//! │  └────────────────┘        └────────────────┘                │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration, loaded once at startup
//! - `session`: the tick-driven [`HostSession`]

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod session;

// Re-export the member crates
pub use vantage_protocol as protocol;
pub use vantage_ui as ui;

// Re-export commonly used types
pub use config::{ConfigError, VantageConfig, DEFAULT_TICK_RATE};
pub use session::{HostSession, ROOT_WIDGET_ID};
