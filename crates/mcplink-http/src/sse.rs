//! Incremental decoding of `text/event-stream` response bodies.

use bytes::BytesMut;

/// Splits a byte stream into SSE events and yields each event's `data`.
///
/// Events without `data:` lines (comments, bare `id:`/`event:`) produce
/// nothing. Multiple `data:` lines in one event are joined with `\n`.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: BytesMut,
}

impl SseDecoder {
    /// Feed one chunk, returning the data of every event it completed.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some((end, delimiter)) = find_event_end(&self.buffer) {
            let raw = self.buffer.split_to(end + delimiter);
            if let Some(data) = event_data(&raw[..end]) {
                events.push(data);
            }
        }
        events
    }

    /// Flush a trailing event that was not followed by a blank line.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = self.buffer.split();
        event_data(&rest)
    }
}

fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn event_data(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let lines: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"event: message\ndata: {\"a\":1}\n\n");
        assert_eq!(events, vec![r#"{"a":1}"#.to_string()]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"jsonrpc\":").is_empty());
        assert!(decoder.push(b"\"2.0\"}\n").is_empty());
        let events = decoder.push(b"\ndata: second\n\n");
        assert_eq!(events, vec![r#"{"jsonrpc":"2.0"}"#, "second"]);
    }

    #[test]
    fn test_crlf_and_multiline_data() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"id: 7\r\ndata: line one\r\ndata: line two\r\n\r\n");
        assert_eq!(events, vec!["line one\nline two"]);
    }

    #[test]
    fn test_comments_and_trailing_event() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\n\n").is_empty());
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("tail"));
    }
}
