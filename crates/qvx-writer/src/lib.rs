//! QlikView data exchange (QVX) file writer.
//!
//! This crate encodes a typed table into the QVX format: an XML table
//! header, a single `0x00` delimiter, and a binary body of fixed-layout
//! cells.
//!
//! # Features
//!
//! - Schema mapping from declared column types and bounds to QVX field types
//! - Signed/unsigned integers, IEEE reals, zero-terminated text and dual
//!   (date/time) fields
//! - Either byte order for numeric fields; dual values are always little-endian
//! - Optional record (`0x1E`) and file (`0x1C`) separator bytes
//! - Bounded-memory streaming through a fixed-capacity body buffer
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use qvx_writer::{
//!     Column, FieldAttrType, FieldAttributeOverride, QvxTable, QvxWriterOptions, write_qvx,
//! };
//!
//! let mut table = QvxTable::with_columns(vec![
//!     Column::integer("Age").with_bounds(0, 120),
//!     Column::string("Name"),
//!     Column::string("Born"),
//! ]);
//! table.add_row(["5", "Al", "2001-04-12"]);
//! table.add_row(["", "Bo", ""]);
//!
//! let options = QvxWriterOptions::new()
//!     .with_table_name("People")
//!     .with_separator_byte(true)
//!     .with_field_attribute(2, FieldAttributeOverride::new(FieldAttrType::Date));
//!
//! let summary = write_qvx(Path::new("people.qvx"), &table, &options).unwrap();
//! println!("{} rows, {} body bytes", summary.rows, summary.body_bytes);
//! ```

pub mod buffer;
pub mod encode;
mod error;
pub mod header;
pub mod settings;
pub mod temporal;
mod types;
mod writer;

// Re-export error types
pub use error::{QvxError, Result};

// Re-export core types
pub use types::{
    BLOCK_SIZE, Column, DEFAULT_BUFFER_CAPACITY, DeclaredType, FieldAttrType, FieldAttributeOverride,
    FieldAttributes, FieldExtent, MAJOR_VERSION, MINOR_VERSION, NullRepresentation, QvSpecialFlag,
    QvxFieldHeader, QvxFieldType, QvxTable, QvxTableHeader, QvxWriterOptions,
};

// Re-export header and encoding entry points
pub use encode::encode_cell;
pub use header::{
    HeaderSerializer, XmlHeaderSerializer, build_field_header, build_table_header,
    render_header_xml,
};

// Re-export writer functionality
pub use settings::{
    OverwritePolicy, QvxSettings, default_table_name, validate_destination, write_qvx_file,
};
pub use writer::{CancellationFlag, HEADER_DELIMITER, QvxWriter, WriteSummary, write_qvx};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
