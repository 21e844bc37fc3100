//! A resumable client for the ledger's streaming HTTP API.
//!
//! The upstream indexing service exposes append-only record feeds (effects,
//! operations) as long-lived `text/event-stream` responses. This crate
//! consumes such a feed, decodes every data frame into a typed record, and
//! delivers records to a caller-supplied handler in feed order. When a
//! connection drops mid-stream, the client silently reconnects from the
//! paging token of the last record the handler actually received, so the
//! caller never observes a gap.
//!
//! # Key Components
//!
//! *   [`stream::StreamClient`]: the streaming engine. One `run` drives one
//!     connection at a time and one handler invocation at a time.
//! *   [`records`]: the typed record families (`Effect`, `Operation`) and the
//!     discriminator dispatch tables used to decode them.
//! *   [`sse`]: the wire-format layer, splitting the response body into
//!     frames and parsing the `label: value` lines within each frame.
//! *   [`config`]: configuration structures and TOML/env loading.

/// Defines configuration structures for the connector.
pub mod config;
/// The error taxonomy surfaced by a stream run.
pub mod error;
/// Typed record families and discriminator-based decoding.
pub mod records;
/// Framing and parsing for the event-stream wire protocol.
pub mod sse;
/// The resumable streaming engine.
pub mod stream;

pub use config::{load_config, ConnectorConfig};
pub use error::StreamError;
pub use stream::{Cursor, RecordHandler, StreamClient};
