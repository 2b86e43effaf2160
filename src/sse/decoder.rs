//! Incremental UTF-8 decoding of body chunks.

use crate::error::StreamError;

/// Streaming UTF-8 decoder.
///
/// A multi-byte character split across chunks is held back until the rest
/// arrives. Bytes that can never form valid UTF-8 become U+FFFD, one per
/// invalid sequence.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, returning every character that is complete so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of input.
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Signal end of input. Leftover bytes are a truncated character.
    pub fn finish(&mut self) -> Result<(), StreamError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            let trailing_bytes = self.pending.len();
            self.pending.clear();
            Err(StreamError::InvalidUtf8 { trailing_bytes })
        }
    }
}
