//! Server-sent-events decoding for streamed chat completions.
//!
//! The body is a sequence of `data: <json>` lines separated by blank lines,
//! terminated by `data: [DONE]`. Chunks from the network can split lines (and
//! UTF-8 sequences) anywhere, so bytes are buffered until a newline arrives.

use crate::error::LlmError;
use crate::types::ChatCompletionChunk;

const DONE: &str = "[DONE]";

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` has been seen; later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw body bytes, returning the answer deltas completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<String, LlmError>> {
        let mut out = Vec::new();
        if self.done {
            return out;
        }
        self.buf.extend_from_slice(bytes);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            self.line(line.trim_end_matches('\r'), &mut out);
            if self.done {
                self.buf.clear();
                break;
            }
        }
        out
    }

    /// Flush a trailing line that arrived without a newline.
    pub fn finish(&mut self) -> Vec<Result<String, LlmError>> {
        let mut out = Vec::new();
        if !self.done && !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&rest);
            self.line(line.trim_end_matches('\r'), &mut out);
        }
        out
    }

    fn line(&mut self, line: &str, out: &mut Vec<Result<String, LlmError>>) {
        // Blank lines end an event; lines starting with ':' are comments.
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim_start();
        if data == DONE {
            self.done = true;
            return;
        }
        match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => out.extend(
                chunk
                    .choices
                    .into_iter()
                    .filter_map(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty())
                    .map(Ok),
            ),
            Err(e) => {
                tracing::debug!(error = %e, "undecodable stream chunk");
                out.push(Err(LlmError::Decode(e)));
            }
        }
    }
}
