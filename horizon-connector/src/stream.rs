//! # Stream Engine
//!
//! Drives one record feed end to end: issue the streaming request, frame
//! the response body, decode data frames, deliver records to the caller's
//! handler, and advance the resumption cursor from each delivered record.
//! When the server closes the stream or the connection resets mid-read, the
//! engine reconnects from the last delivered paging token; the caller only
//! ever sees errors that are genuinely terminal.
//!
//! The loop is strictly sequential: one connection open at a time, one
//! handler invocation in flight at a time, no read-ahead beyond the frame
//! currently being processed. A slow handler therefore slows frame
//! consumption instead of queueing records. Cancellation is cooperative and
//! polled before every frame pull; an in-flight network read is never torn
//! down preemptively, since a partially consumed frame would corrupt the
//! resumption state.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::ConnectorConfig;
use crate::error::StreamError;
use crate::records::{Effect, Operation, StreamRecord};
use crate::sse::{Frame, FrameScanner, MESSAGE_EVENT};

/// The content type requested from the streaming endpoint.
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// An opaque position in the upstream append-only record sequence.
///
/// The engine never interprets the value; it is read from a delivered
/// record's `paging_token` field and sent back verbatim as the `cursor`
/// query parameter when reconnecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(pub String);

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Cursor(value.to_string())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Cursor(value)
    }
}

/// The callback seam through which decoded records reach the caller.
///
/// The engine awaits each invocation before pulling the next frame, so the
/// handler provides natural backpressure. Returning an error aborts the run
/// with that error; the record is not retried.
#[async_trait]
pub trait RecordHandler<R: StreamRecord>: Send {
    async fn on_record(&mut self, record: R) -> Result<()>;
}

/// How one connection's reading phase ended.
enum Session {
    /// The caller requested cancellation; the run returns `Ok(())`.
    Cancelled,
    /// The body was exhausted or the connection reset; eligible for resume.
    Ended,
}

/// A client for the ledger's streaming API.
///
/// One instance owns one HTTP client and can drive any number of sequential
/// or concurrent runs; each run tracks its own connection and cursor
/// exclusively, so no state is shared between them.
#[derive(Debug, Clone)]
pub struct StreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl StreamClient {
    /// Creates a client from the connector configuration.
    pub fn new(config: &ConnectorConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.horizon.connect_timeout_secs))
            .build()
            .map_err(StreamError::Connection)?;

        // Trailing slashes would produce `//resource` paths after joining.
        let base_url = config.horizon.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        Ok(Self { http, base_url })
    }

    /// Streams the effect feed. See [`run`](Self::run).
    pub async fn stream_effects<H>(
        &self,
        cursor: Option<Cursor>,
        handler: H,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        H: RecordHandler<Effect>,
    {
        self.run("effects", cursor, handler, cancel).await
    }

    /// Streams the operation feed. See [`run`](Self::run).
    pub async fn stream_operations<H>(
        &self,
        cursor: Option<Cursor>,
        handler: H,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        H: RecordHandler<Operation>,
    {
        self.run("operations", cursor, handler, cancel).await
    }

    /// Runs the streaming loop for `resource` until cancellation or a fatal
    /// condition.
    ///
    /// Starts at `cursor` (server-chosen position when `None`) and delivers
    /// every record of the feed to `handler`, in feed order, exactly once
    /// per connection pass. Cancellation yields `Ok(())`; every other exit
    /// is the precise [`StreamError`] that terminated the run.
    pub async fn run<R, H>(
        &self,
        resource: &str,
        mut cursor: Option<Cursor>,
        mut handler: H,
        cancel: CancellationToken,
    ) -> Result<(), StreamError>
    where
        R: StreamRecord,
        H: RecordHandler<R>,
    {
        loop {
            let url = self.stream_url(resource, cursor.as_ref())?;
            tracing::debug!(%url, family = ?R::FAMILY, "connecting to record stream");

            let response = self
                .http
                .get(url)
                .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
                .send()
                .await
                .map_err(StreamError::Connection)?;

            let status = response.status();
            if !status.is_success() {
                return Err(StreamError::Status(status));
            }

            let mut body = response.bytes_stream();
            let session = read_session(&mut body, &mut cursor, &mut handler, &cancel).await?;

            match session {
                Session::Cancelled => return Ok(()),
                Session::Ended => match &cursor {
                    Some(position) => {
                        tracing::info!(cursor = %position, resource, "stream ended, resuming");
                    }
                    // Without a single observed paging token the feed cannot
                    // be resumed at a stable position.
                    None => return Err(StreamError::Resumption),
                },
            }
        }
    }

    fn stream_url(&self, resource: &str, cursor: Option<&Cursor>) -> Result<Url, StreamError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, resource))?;
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", &cursor.0);
        }
        Ok(url)
    }
}

/// Reads one connection's body to its end, delivering records as they
/// complete. Advances `cursor` to the token of each record the handler has
/// accepted, and only those.
async fn read_session<R, H, S>(
    body: &mut S,
    cursor: &mut Option<Cursor>,
    handler: &mut H,
    cancel: &CancellationToken,
) -> Result<Session, StreamError>
where
    R: StreamRecord,
    H: RecordHandler<R>,
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    let mut scanner = FrameScanner::new();

    loop {
        if cancel.is_cancelled() {
            tracing::info!("cancellation requested, stopping stream");
            return Ok(Session::Cancelled);
        }

        let raw = match next_frame(&mut scanner, body).await {
            Ok(Some(raw)) => raw,
            // Clean close; any partial trailing frame stays in the scanner
            // and is discarded with it.
            Ok(None) => return Ok(Session::Ended),
            Err(err) if is_stream_interruption(&err) => {
                tracing::debug!(error = %err, "stream interrupted mid-read");
                return Ok(Session::Ended);
            }
            Err(err) => return Err(StreamError::Io(err)),
        };

        let frame = match Frame::parse(&raw) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed frame");
                continue;
            }
        };

        if frame.event != MESSAGE_EVENT || frame.data.is_empty() {
            continue;
        }

        let record = R::decode(frame.data.as_bytes())?;
        let token = record.paging_token().to_string();

        handler
            .on_record(record)
            .await
            .map_err(StreamError::Handler)?;

        // A delivered record without a token leaves no position to resume
        // from; failing now beats re-reading the same window forever.
        if token.is_empty() {
            return Err(StreamError::Resumption);
        }
        *cursor = Some(Cursor(token));
    }
}

/// Pulls body chunks into the scanner until a complete frame is available.
/// `Ok(None)` means the body ended cleanly.
async fn next_frame<S>(
    scanner: &mut FrameScanner,
    body: &mut S,
) -> Result<Option<Vec<u8>>, reqwest::Error>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
{
    loop {
        if let Some(frame) = scanner.next_frame() {
            return Ok(Some(frame));
        }
        match body.next().await {
            Some(Ok(chunk)) => scanner.extend(&chunk),
            Some(Err(err)) => return Err(err),
            None => return Ok(None),
        }
    }
}

/// Whether a body-read error belongs to the reset/unexpected-EOF class that
/// resumption handles. Timeouts, TLS failures, and connect-phase errors do
/// not; retrying those would mask persistent misconfiguration.
fn is_stream_interruption(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return false;
    }
    if err.is_body() {
        return true;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::UnexpectedEof
            );
        }
        source = cause.source();
    }
    false
}
