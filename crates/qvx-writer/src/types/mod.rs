//! Core types for QVX files.

mod field;
mod options;
mod table;

pub use field::{
    BLOCK_SIZE, FieldAttrType, FieldAttributes, FieldExtent, MAJOR_VERSION, MINOR_VERSION,
    NullRepresentation, QvSpecialFlag, QvxFieldHeader, QvxFieldType, QvxTableHeader,
};
pub use options::{DEFAULT_BUFFER_CAPACITY, FieldAttributeOverride, QvxWriterOptions};
pub use table::{Column, DeclaredType, QvxTable};
