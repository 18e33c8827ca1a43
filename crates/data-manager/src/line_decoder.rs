//! Incremental newline-delimited JSON decoder
//!
//! The decoder is a synchronous state machine: callers push raw byte chunks
//! with [`LineDecoder::feed`] and signal end-of-stream with
//! [`LineDecoder::finish`]; every complete, non-blank line is parsed as JSON
//! and queued for [`LineDecoder::next_value`]. Lines end at `\n` or `\r\n`.
//!
//! Bytes are buffered rather than text so that a multi-byte UTF-8 sequence
//! split across two chunks is reassembled before decoding.

use serde_json::Value;
use std::collections::VecDeque;
use viz_house_shared::{ChartsError, ChartsResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Unterminated tail of the input
    buffer: Vec<u8>,
    /// Offset in `buffer` already searched for a newline
    scanned: usize,
    pending: VecDeque<Value>,
    /// Lines seen so far, blank ones included
    line_count: usize,
    bom_checked: bool,
    finished: bool,
    failure: Option<ChartsError>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and parse every line it completes.
    ///
    /// Returns the number of values queued by this chunk. The first
    /// malformed line poisons the decoder: its error is returned now and
    /// from every later call.
    pub fn feed(&mut self, chunk: &[u8]) -> ChartsResult<usize> {
        self.ensure_usable()?;

        self.buffer.extend_from_slice(chunk);
        self.strip_bom(false);

        let mut start = 0;
        let mut queued = 0;
        let mut search_from = self.scanned;

        while let Some(pos) = self.buffer[search_from..].iter().position(|b| *b == b'\n') {
            let end = search_from + pos;
            let line = strip_carriage_return(&self.buffer[start..end]);
            self.line_count += 1;

            match parse_line(line, self.line_count) {
                Ok(Some(value)) => {
                    self.pending.push_back(value);
                    queued += 1;
                }
                Ok(None) => {}
                Err(err) => return Err(self.poison(err)),
            }

            start = end + 1;
            search_from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        Ok(queued)
    }

    /// Signal end-of-stream and parse the remaining unterminated line, if any.
    pub fn finish(&mut self) -> ChartsResult<usize> {
        self.ensure_usable()?;
        self.finished = true;
        self.strip_bom(true);

        if self.buffer.is_empty() {
            return Ok(0);
        }

        let tail = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        self.line_count += 1;

        match parse_line(&tail, self.line_count) {
            Ok(Some(value)) => {
                self.pending.push_back(value);
                Ok(1)
            }
            Ok(None) => Ok(0),
            Err(err) => Err(self.poison(err)),
        }
    }

    /// Pop the oldest decoded value
    pub fn next_value(&mut self) -> Option<Value> {
        self.pending.pop_front()
    }

    /// Take every decoded value queued so far
    pub fn drain(&mut self) -> Vec<Value> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn failure(&self) -> Option<&ChartsError> {
        self.failure.as_ref()
    }

    /// Number of bytes waiting for a line terminator
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    fn ensure_usable(&self) -> ChartsResult<()> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if self.finished {
            return Err(ChartsError::Decode {
                message: "decoder already reached end of stream".to_string(),
                line: None,
            });
        }
        Ok(())
    }

    fn poison(&mut self, err: ChartsError) -> ChartsError {
        log::debug!("NDJSON decoding aborted: {err}");
        self.buffer.clear();
        self.scanned = 0;
        self.failure = Some(err.clone());
        err
    }

    /// Drop a leading byte-order mark; waits for three bytes unless at end of stream.
    fn strip_bom(&mut self, at_end: bool) {
        if self.bom_checked {
            return;
        }
        if !at_end && self.buffer.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.buffer) {
            return;
        }
        if self.buffer.starts_with(UTF8_BOM) {
            self.buffer.drain(..UTF8_BOM.len());
            self.scanned = self.scanned.saturating_sub(UTF8_BOM.len());
        }
        self.bom_checked = true;
    }
}

fn strip_carriage_return(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse one line; blank lines yield `None`
fn parse_line(line: &[u8], line_number: usize) -> ChartsResult<Option<Value>> {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ChartsError::decode_at(line_number, e.to_string()))
}
