//! QVX file writer.
//!
//! A QVX file is `[header document][0x00][body]`. The body holds, for each
//! row, an optional record separator followed by every field's encoded cell
//! in header order, and ends with an optional file separator.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::buffer::BlockBuffer;
use crate::encode::encode_cell_into;
use crate::error::{QvxError, Result};
use crate::header::{HeaderSerializer, XmlHeaderSerializer, build_table_header};
use crate::types::{Column, QvxTable, QvxTableHeader, QvxWriterOptions};

/// Delimiter between the header document and the body.
pub const HEADER_DELIMITER: u8 = 0x00;

/// Shared flag for stopping a write between rows.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// The header that was written.
    pub header: QvxTableHeader,
    /// Number of rows written.
    pub rows: usize,
    /// Body bytes written, after the header delimiter.
    pub body_bytes: u64,
}

/// QVX file writer.
///
/// Consumed by a single write; each write owns its header, buffer and sink.
pub struct QvxWriter<W: Write> {
    sink: W,
    options: QvxWriterOptions,
    serializer: Box<dyn HeaderSerializer>,
    cancellation: Option<CancellationFlag>,
}

impl<W: Write> QvxWriter<W> {
    /// Create a new QVX writer.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, QvxWriterOptions::default())
    }

    /// Create a new QVX writer with options.
    pub fn with_options(sink: W, options: QvxWriterOptions) -> Self {
        Self {
            sink,
            options,
            serializer: Box::new(XmlHeaderSerializer),
            cancellation: None,
        }
    }

    /// Replace the header document serializer.
    #[must_use]
    pub fn with_serializer(mut self, serializer: impl HeaderSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Check `flag` before each row and stop when it is set.
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Write an in-memory table.
    pub fn write_table(self, table: &QvxTable) -> Result<WriteSummary> {
        self.write_rows(&table.columns, &table.rows)
    }

    /// Write a table given its columns and a stream of rows.
    ///
    /// Rows are encoded one at a time, so the table does not need to fit in
    /// memory.
    ///
    /// # Errors
    ///
    /// Any error aborts the write. Bytes already written stay in the sink.
    pub fn write_rows<I, R>(mut self, columns: &[Column], rows: I) -> Result<WriteSummary>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let header = build_table_header(columns, &self.options)?;
        info!(
            table = %header.table_name,
            fields = header.num_fields(),
            separators = header.uses_separator_byte,
            "writing QVX table"
        );

        self.serializer.serialize(&header, &mut self.sink)?;
        self.sink.write_all(&[HEADER_DELIMITER])?;

        let mut buffer = BlockBuffer::new(
            self.sink,
            self.options.buffer_capacity,
            header.uses_separator_byte,
        );
        let mut cell = Vec::new();
        let mut row_count = 0usize;

        for (index, row) in rows.into_iter().enumerate() {
            if self
                .cancellation
                .as_ref()
                .is_some_and(CancellationFlag::is_cancelled)
            {
                return Err(QvxError::Cancelled {
                    rows_written: row_count,
                });
            }

            let row = row.as_ref();
            if row.len() != header.fields.len() {
                return Err(QvxError::RowLengthMismatch {
                    row: index,
                    expected: header.fields.len(),
                    actual: row.len(),
                });
            }

            buffer.write_row_separator()?;
            for (value, field) in row.iter().zip(&header.fields) {
                cell.clear();
                encode_cell_into(value, field, &mut cell).map_err(|e| e.at_row(index))?;
                buffer.append(&cell)?;
            }
            row_count += 1;
        }

        debug!(flushes = buffer.flush_count(), "body encoded");
        let (_sink, body_bytes) = buffer.finish()?;
        info!(rows = row_count, body_bytes, "QVX table written");

        Ok(WriteSummary {
            header,
            rows: row_count,
            body_bytes,
        })
    }
}

impl QvxWriter<File> {
    /// Create a QVX file for writing, replacing any existing file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    /// Create a QVX file with options.
    pub fn create_with_options(path: &Path, options: QvxWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a table to a QVX file.
///
/// This is a convenience function that creates the file and writes the table.
pub fn write_qvx(path: &Path, table: &QvxTable, options: &QvxWriterOptions) -> Result<WriteSummary> {
    QvxWriter::create_with_options(path, options.clone())?.write_table(table)
}
