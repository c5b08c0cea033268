//! Fixed-capacity body buffer over the output sink.

use std::io::{self, Write};

use tracing::trace;

use crate::error::Result;

/// Record separator, written before each row when separators are enabled.
pub const RECORD_SEPARATOR: u8 = 0x1E;

/// File separator, written once after the last row when separators are enabled.
pub const FILE_SEPARATOR: u8 = 0x1C;

/// Append-only byte buffer that flushes to its sink when full.
///
/// A value passed to [`append`](Self::append) is never split across two
/// flushes: when it does not fit, the buffered bytes are written out first
/// and the whole value starts the next buffer.
pub struct BlockBuffer<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    capacity: usize,
    uses_separator_byte: bool,
    flushes: usize,
    bytes_written: u64,
}

impl<W: Write> BlockBuffer<W> {
    /// Create a buffer of `capacity` bytes over `sink`.
    pub fn new(sink: W, capacity: usize, uses_separator_byte: bool) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(capacity),
            capacity,
            uses_separator_byte,
            flushes: 0,
            bytes_written: 0,
        }
    }

    /// Append bytes, flushing first if they do not fit.
    ///
    /// # Errors
    ///
    /// Fails with an I/O error if `bytes` is larger than the whole buffer
    /// or the sink rejects a flush.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.capacity {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "value of {} bytes exceeds buffer capacity of {} bytes",
                    bytes.len(),
                    self.capacity
                ),
            )
            .into());
        }
        if self.buffer.len() + bytes.len() > self.capacity {
            self.flush_buffer()?;
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// Append the record separator if separators are enabled.
    pub fn write_row_separator(&mut self) -> Result<()> {
        if self.uses_separator_byte {
            self.append(&[RECORD_SEPARATOR])?;
        }
        Ok(())
    }

    /// Append the file separator if separators are enabled.
    pub fn write_file_separator(&mut self) -> Result<()> {
        if self.uses_separator_byte {
            self.append(&[FILE_SEPARATOR])?;
        }
        Ok(())
    }

    /// Flush remaining bytes, write the file separator if enabled, and hand
    /// back the sink with the total number of body bytes written.
    ///
    /// Call once; dropping the returned sink closes it.
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.write_file_separator()?;
        self.flush_buffer()?;
        self.sink.flush()?;
        Ok((self.sink, self.bytes_written))
    }

    /// Number of times buffered bytes were written to the sink.
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Bytes written to the sink so far, excluding bytes still buffered.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Bytes currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    fn flush_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.sink.write_all(&self.buffer)?;
        self.flushes += 1;
        self.bytes_written += self.buffer.len() as u64;
        trace!(
            bytes = self.buffer.len(),
            total = self.bytes_written,
            "flushed body buffer"
        );
        self.buffer.clear();
        Ok(())
    }
}
