#[cfg(test)]
#[path = "stream_decoder_test.rs"]
mod tests;

use std::collections::VecDeque;
use std::str;

use anyhow::Result;
use futures::stream;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;

use crate::domain::models::ByteStream;

const FRAME_PREFIX: &str = "data: ";

#[derive(Deserialize)]
struct StreamFrame {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Incremental decoder for line delimited `data: {json}` frames. Lines end
/// with LF, CRLF or a lone CR. Output does not depend on how the body was
/// chunked.
#[derive(Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
    line: String,
}

impl StreamDecoder {
    /// Feeds raw bytes and drains the deltas of every line they complete.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        self.decode_pending();

        let mut deltas = vec![];
        while let Some(idx) = self.line.find(|c: char| return c == '\r' || c == '\n') {
            let rest = &self.line[idx..];
            let terminator = match rest {
                "\r" => break,
                _ if rest.starts_with("\r\n") => 2,
                _ => 1,
            };

            let line = self.line[..idx].to_string();
            self.line.drain(..idx + terminator);

            if let Some(delta) = parse_line(&line) {
                deltas.push(delta);
            }
        }

        return deltas;
    }

    /// Called once the body has ended. A held back `\r` still terminates its
    /// line; anything else left over is an unterminated line and is dropped.
    pub fn finish(&mut self) -> Vec<String> {
        let mut deltas = vec![];
        if self.pending.is_empty() && self.line.ends_with('\r') {
            let line = self.line.trim_end_matches('\r').to_string();
            self.line.clear();
            deltas.extend(parse_line(&line));
        }

        if self.has_partial() {
            tracing::debug!(
                partial = self.line.len(),
                "Stream ended on an unterminated line, dropping it"
            );
            self.pending.clear();
            self.line.clear();
        }

        return deltas;
    }

    /// Whether bytes or text are still waiting for a line terminator.
    pub fn has_partial(&self) -> bool {
        return !self.pending.is_empty() || !self.line.is_empty();
    }

    /// Moves every complete code point from `pending` into the line buffer.
    /// A code point split across chunks stays in `pending` until the rest of
    /// it arrives. Invalid sequences become U+FFFD.
    fn decode_pending(&mut self) {
        loop {
            match str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.line.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = str::from_utf8(&self.pending[..valid]) {
                        self.line.push_str(text);
                    }

                    match err.error_len() {
                        Some(len) => {
                            self.line.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Lazily decodes a reply body into deltas. A transport error is yielded
    /// once and ends the sequence. An unterminated final line is dropped.
    pub fn decode(body: ByteStream) -> BoxStream<'static, Result<String>> {
        let state = DecodeState {
            body,
            decoder: StreamDecoder::default(),
            ready: VecDeque::new(),
            done: false,
        };

        return stream::unfold(state, next_delta).boxed();
    }
}

struct DecodeState {
    body: ByteStream,
    decoder: StreamDecoder,
    ready: VecDeque<String>,
    done: bool,
}

async fn next_delta(mut state: DecodeState) -> Option<(Result<String>, DecodeState)> {
    loop {
        if let Some(delta) = state.ready.pop_front() {
            return Some((Ok(delta), state));
        }

        if state.done {
            return None;
        }

        match state.body.next().await {
            Some(Ok(chunk)) => {
                state.ready.extend(state.decoder.feed(&chunk));
            }
            Some(Err(err)) => {
                state.done = true;
                return Some((Err(err), state));
            }
            None => {
                state.done = true;
                state.ready.extend(state.decoder.finish());
            }
        }
    }
}

fn parse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix(FRAME_PREFIX)?;

    let frame = match serde_json::from_str::<StreamFrame>(payload) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::debug!(error = ?err, "Skipping malformed stream frame");
            return None;
        }
    };

    if let Some(error) = frame.error {
        tracing::warn!(error = %error, "Platform reported an error in the stream");
    }

    return frame.content.filter(|content| return !content.is_empty());
}
