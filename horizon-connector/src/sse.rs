//! # Event-Stream Framing
//!
//! The upstream feed is a line-oriented byte stream in which frames are
//! delimited by blank lines. [`FrameScanner`] cuts the chunked response body
//! into discrete frames, and [`Frame::parse`] interprets one frame's
//! `label: value` lines into an event label and a data payload.
//!
//! A scanner lives for exactly one connection. If the connection ends while
//! a frame is still open, the incomplete tail stays in the scanner's buffer
//! and is never emitted.

use thiserror::Error;

/// The event label carried by data-bearing frames. Frames with any other
/// label are discarded without decoding.
pub const MESSAGE_EVENT: &str = "message";

/// A single malformed frame. Recovered locally by skipping the frame; the
/// stream itself keeps going.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    #[error("frame line has no label: {0:?}")]
    MissingLabel(String),
}

/// Incremental splitter that turns a chunked byte source into discrete
/// frames at blank-line boundaries.
///
/// Feed raw chunks with [`extend`](Self::extend) and drain completed frames
/// with [`next_frame`](Self::next_frame). Both `\n\n` and `\r\n\r\n`
/// delimiters are recognized.
#[derive(Debug, Default)]
pub struct FrameScanner {
    buf: Vec<u8>,
}

impl FrameScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk of the response body to the internal buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Returns the next complete frame, without its closing blank line, or
    /// `None` if no boundary has been buffered yet.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let (end, resume) = self.find_boundary()?;
        let frame = self.buf[..end].to_vec();
        self.buf.drain(..resume);
        Some(frame)
    }

    /// Locates the first blank-line boundary: the frame ends at `.0`, the
    /// next frame begins at `.1`.
    fn find_boundary(&self) -> Option<(usize, usize)> {
        let buf = &self.buf;
        let mut i = 0;
        while i + 1 < buf.len() {
            if buf[i] == b'\n' {
                if buf[i + 1] == b'\n' {
                    return Some((i, i + 2));
                }
                if buf[i + 1] == b'\r' && i + 2 < buf.len() && buf[i + 2] == b'\n' {
                    return Some((i, i + 3));
                }
            }
            i += 1;
        }
        None
    }
}

/// One parsed unit of the wire protocol: an event label plus the payload
/// assembled from its `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame's event label, `"message"` when the frame carries none.
    pub event: String,
    /// Concatenation of all `data:` line values, joined with `\n`.
    pub data: String,
    /// The last `id:` value seen in the frame, if any.
    pub id: Option<String>,
    /// The server's reconnection-delay hint, if the frame carried one.
    pub retry: Option<u64>,
}

impl Frame {
    /// Parses the lines of one frame.
    ///
    /// Comment lines (leading `:`) and unrecognized labels are parsed but
    /// contribute nothing to the payload. A single space after a label's
    /// colon is stripped. A non-comment line without a colon fails with
    /// [`FrameError::MissingLabel`].
    pub fn parse(raw: &[u8]) -> Result<Self, FrameError> {
        let text = std::str::from_utf8(raw)?;

        let mut event = None;
        let mut data: Vec<&str> = Vec::new();
        let mut id = None;
        let mut retry = None;

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some((label, value)) = line.split_once(':') else {
                return Err(FrameError::MissingLabel(line.to_string()));
            };
            let value = value.strip_prefix(' ').unwrap_or(value);
            match label {
                "event" => event = Some(value.to_string()),
                "data" => data.push(value),
                "id" => id = Some(value.to_string()),
                "retry" => retry = value.parse().ok(),
                _ => {}
            }
        }

        Ok(Frame {
            event: event.unwrap_or_else(|| MESSAGE_EVENT.to_string()),
            data: data.join("\n"),
            id,
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(scanner: &mut FrameScanner) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = scanner.next_frame() {
            frames.push(String::from_utf8(frame).unwrap());
        }
        frames
    }

    #[test]
    fn splits_at_blank_line_boundaries() {
        let mut scanner = FrameScanner::new();
        scanner.extend(b"data: one\n\ndata: two\n\n");
        assert_eq!(drain(&mut scanner), vec!["data: one", "data: two"]);
    }

    #[test]
    fn tolerates_crlf_delimiters() {
        let mut scanner = FrameScanner::new();
        scanner.extend(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(drain(&mut scanner), vec!["data: one\r", "data: two\r"]);
    }

    #[test]
    fn reassembles_frames_across_chunks() {
        let mut scanner = FrameScanner::new();
        scanner.extend(b"data: on");
        assert!(scanner.next_frame().is_none());
        scanner.extend(b"e\n");
        assert!(scanner.next_frame().is_none());
        scanner.extend(b"\ndata: two\n\n");
        assert_eq!(drain(&mut scanner), vec!["data: one", "data: two"]);
    }

    #[test]
    fn trailing_partial_frame_is_never_emitted() {
        let mut scanner = FrameScanner::new();
        scanner.extend(b"data: one\n\ndata: trunca");
        assert_eq!(drain(&mut scanner), vec!["data: one"]);
        assert!(scanner.next_frame().is_none());
    }

    #[test]
    fn parse_defaults_to_message_event() {
        let frame = Frame::parse(b"data: hello").unwrap();
        assert_eq!(frame.event, "message");
        assert_eq!(frame.data, "hello");
    }

    #[test]
    fn parse_reads_explicit_event_label() {
        let frame = Frame::parse(b"event: open\ndata: hi").unwrap();
        assert_eq!(frame.event, "open");
        assert_eq!(frame.data, "hi");
    }

    #[test]
    fn parse_joins_multiple_data_lines() {
        let frame = Frame::parse(b"data: {\"a\":\ndata: 1}").unwrap();
        assert_eq!(frame.data, "{\"a\":\n1}");
    }

    #[test]
    fn parse_strips_one_leading_space_only() {
        let frame = Frame::parse(b"data:  padded").unwrap();
        assert_eq!(frame.data, " padded");
        let frame = Frame::parse(b"data:tight").unwrap();
        assert_eq!(frame.data, "tight");
    }

    #[test]
    fn parse_skips_comments_and_captures_id_and_retry() {
        let frame = Frame::parse(b": keep-alive\nid: 42\nretry: 1500\ndata: x").unwrap();
        assert_eq!(frame.data, "x");
        assert_eq!(frame.id.as_deref(), Some("42"));
        assert_eq!(frame.retry, Some(1500));
    }

    #[test]
    fn parse_rejects_line_without_label() {
        let err = Frame::parse(b"data: ok\ngarbage line").unwrap_err();
        assert!(matches!(err, FrameError::MissingLabel(_)));
    }
}
