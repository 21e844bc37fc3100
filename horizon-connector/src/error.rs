use reqwest::StatusCode;
use thiserror::Error;

use crate::records::DecodeError;

/// Defines the terminal conditions of a stream run.
///
/// A run returns exactly the error that stopped it, so callers can branch on
/// the variant. Transient disconnects between records never surface here;
/// they are absorbed by the reconnect loop as long as a paging token has been
/// established.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The base URL and resource did not combine into a valid URL.
    #[error("invalid stream URL: {0}")]
    Url(#[from] url::ParseError),

    /// The HTTP connection could not be established (DNS, TLS, refused
    /// connection). Not retried at this layer; the caller decides whether to
    /// restart the whole run.
    #[error("failed to connect to stream endpoint: {0}")]
    Connection(#[source] reqwest::Error),

    /// The server answered the streaming request with a non-success status.
    #[error("stream endpoint returned HTTP {0}")]
    Status(StatusCode),

    /// A transport failure while reading the body that is not in the
    /// reset/unexpected-EOF class handled by reconnecting.
    #[error("stream transport failed: {0}")]
    Io(#[source] reqwest::Error),

    /// A data frame failed structural decoding for its selected variant.
    /// Payload corruption is not assumed transient, so this is fatal.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The caller's handler rejected a record. Propagated verbatim; the
    /// record is not retried.
    #[error("record handler failed: {0}")]
    Handler(#[source] anyhow::Error),

    /// The stream cannot be resumed because no usable paging token is
    /// available at the point the connection ended.
    #[error("no paging token available, cannot resume stream")]
    Resumption,
}
