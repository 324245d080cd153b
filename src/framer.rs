//! Reassembly of an arbitrarily-chunked byte stream into complete SSE
//! `data:` frames.

/// One complete protocol line carrying an event payload (the bytes after the
/// `data:` prefix, trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: String,
}

/// Reserved prefix marking a line as event data. Everything else on the
/// stream (comments, keep-alives, blank lines) is dropped.
pub const EVENT_PREFIX: &str = "data:";

/// Turns raw response chunks into complete frames.
///
/// Chunk boundaries are arbitrary: a chunk may end mid-line or even
/// mid-UTF-8-codepoint. The carry-over buffer is kept as bytes and split on
/// the `\n` byte — which never occurs inside a multi-byte sequence — so only
/// complete lines are ever decoded to text.
#[derive(Debug, Default)]
pub struct StreamFramer {
    buffer: Vec<u8>,
}

impl StreamFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the carry-over buffer and emits every complete
    /// line that qualifies as a frame. The final, possibly-incomplete line
    /// stays buffered for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            if let Some(frame) = frame_from_line(&line[..line_end]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flushes the carry-over buffer when the transport signals
    /// end-of-stream. A buffered partial line is treated as complete even
    /// without a trailing newline, with the same prefix filtering.
    pub fn finish(&mut self) -> Vec<Frame> {
        let rest = std::mem::take(&mut self.buffer);
        frame_from_line(&rest).into_iter().collect()
    }
}

fn frame_from_line(line: &[u8]) -> Option<Frame> {
    let text = String::from_utf8_lossy(line);
    let payload = text.trim_end_matches('\r').strip_prefix(EVENT_PREFIX)?;
    Some(Frame {
        payload: payload.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(frames: Vec<Frame>) -> Vec<String> {
        frames.into_iter().map(|f| f.payload).collect()
    }

    #[test]
    fn test_single_complete_line() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data: {\"type\":\"DebateStart\"}\n");
        assert_eq!(payloads(frames), vec!["{\"type\":\"DebateStart\"}"]);
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut framer = StreamFramer::new();
        assert!(framer.feed(b"data: {\"ty").is_empty());
        let frames = framer.feed(b"pe\":\"DebateStart\"}\n");
        assert_eq!(payloads(frames), vec!["{\"type\":\"DebateStart\"}"]);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data: one\ndata: two\ndata: thr");
        assert_eq!(payloads(frames), vec!["one", "two"]);
        let frames = framer.feed(b"ee\n");
        assert_eq!(payloads(frames), vec!["three"]);
    }

    #[test]
    fn test_non_data_lines_dropped() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b": keep-alive\n\nevent: message\ndata: real\n");
        assert_eq!(payloads(frames), vec!["real"]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data: one\r\ndata: two\r\n");
        assert_eq!(payloads(frames), vec!["one", "two"]);
    }

    #[test]
    fn test_chunk_ends_mid_codepoint() {
        let mut framer = StreamFramer::new();
        // "é" is 0xC3 0xA9 — split it across two chunks
        assert!(framer.feed(b"data: caf\xc3").is_empty());
        let frames = framer.feed(b"\xa9\n");
        assert_eq!(payloads(frames), vec!["café"]);
    }

    #[test]
    fn test_finish_flushes_partial_line() {
        let mut framer = StreamFramer::new();
        assert!(framer.feed(b"data: tail").is_empty());
        assert_eq!(payloads(framer.finish()), vec!["tail"]);
    }

    #[test]
    fn test_finish_empty_buffer_yields_nothing() {
        let mut framer = StreamFramer::new();
        framer.feed(b"data: done\n");
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn test_finish_drops_non_data_tail() {
        let mut framer = StreamFramer::new();
        framer.feed(b": half a comment");
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn test_no_frame_emitted_twice() {
        let mut framer = StreamFramer::new();
        let first = framer.feed(b"data: once\n");
        assert_eq!(first.len(), 1);
        assert!(framer.feed(b"").is_empty());
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn test_prefix_without_space_separator() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data:{\"x\":1}\n");
        assert_eq!(payloads(frames), vec!["{\"x\":1}"]);
    }

    #[test]
    fn test_payload_is_trimmed() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data:   padded   \n");
        assert_eq!(payloads(frames), vec!["padded"]);
    }

    #[test]
    fn test_empty_data_line_yields_empty_payload() {
        let mut framer = StreamFramer::new();
        let frames = framer.feed(b"data:\n");
        assert_eq!(payloads(frames), vec![""]);
    }
}
