//! QVX table header construction and rendering.
//!
//! - [`schema`]: derives field descriptors from column metadata
//! - [`xml`]: renders the header document that precedes the body

pub mod schema;
pub mod xml;

pub use schema::{build_field_header, build_table_header};
pub use xml::{HeaderSerializer, XmlHeaderSerializer, render_header_xml};
