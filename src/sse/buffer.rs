//! Line splitting over decoded text.

use crate::error::StreamError;

/// Default cap on a single buffered line (1 MiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Accumulates text fragments and yields complete lines.
///
/// Lines end at `\n`; a `\r` directly before it is stripped. The trailing
/// partial line is retained until a later fragment completes it.
#[derive(Debug)]
pub struct LineBuffer {
    buffer: String,
    /// Length of the buffered prefix already known to hold no `\n`.
    scanned: usize,
    max_line_bytes: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: String::new(),
            scanned: 0,
            max_line_bytes,
        }
    }

    /// Append a fragment and return every line it completes.
    ///
    /// Fails once any single line (complete or still buffered) exceeds the
    /// configured maximum.
    pub fn feed(&mut self, fragment: &str) -> Result<Vec<String>, StreamError> {
        self.buffer.push_str(fragment);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut search_from = self.scanned;
        while let Some(offset) = self.buffer[search_from..].find('\n') {
            let end = search_from + offset;
            let line_end = if self.buffer[start..end].ends_with('\r') {
                end - 1
            } else {
                end
            };
            if line_end - start > self.max_line_bytes {
                return Err(self.too_long());
            }
            lines.push(self.buffer[start..line_end].to_string());
            start = end + 1;
            search_from = start;
        }
        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_line_bytes {
            return Err(self.too_long());
        }

        Ok(lines)
    }

    /// The retained partial line.
    pub fn remaining(&self) -> &str {
        &self.buffer
    }

    /// Take whatever partial line is left at end of input.
    pub fn take_remaining(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            self.scanned = 0;
            let line = std::mem::take(&mut self.buffer);
            Some(line.strip_suffix('\r').map(str::to_string).unwrap_or(line))
        }
    }

    fn too_long(&mut self) -> StreamError {
        self.buffer.clear();
        self.scanned = 0;
        StreamError::LineTooLong {
            limit: self.max_line_bytes,
        }
    }
}
