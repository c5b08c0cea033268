//! Header document rendering.
//!
//! The body is preceded by a self-describing header document and a single
//! NUL delimiter. [`HeaderSerializer`] is the seam for that document; the
//! default [`XmlHeaderSerializer`] renders the `QvxTableHeader` XML schema.

use std::io::Write;

use chrono::SecondsFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{QvxError, Result};
use crate::types::{QvxFieldHeader, QvxTableHeader};

/// Renders a table header into the output ahead of the body.
pub trait HeaderSerializer {
    /// Write the header document for `header` to `out`.
    ///
    /// The document must not contain a NUL byte or other characters XML 1.0
    /// cannot represent.
    fn serialize(&self, header: &QvxTableHeader, out: &mut dyn Write) -> Result<()>;
}

/// XML header document, as read by QlikView and Qlik Sense.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlHeaderSerializer;

impl HeaderSerializer for XmlHeaderSerializer {
    fn serialize(&self, header: &QvxTableHeader, out: &mut dyn Write) -> Result<()> {
        let document = render_header_xml(header)?;
        if let Some(&byte) = document.iter().find(|&&b| is_forbidden_control(b)) {
            return Err(QvxError::header_serialization(format!(
                "header contains control character 0x{byte:02X}"
            )));
        }
        out.write_all(&document)?;
        Ok(())
    }
}

/// C0 controls other than tab, line feed and carriage return are not XML 1.0
/// characters. UTF-8 continuation bytes never fall in this range.
fn is_forbidden_control(byte: u8) -> bool {
    byte < 0x20 && !matches!(byte, b'\t' | b'\n' | b'\r')
}

/// Render the header as an XML document.
pub fn render_header_xml(header: &QvxTableHeader) -> Result<Vec<u8>> {
    let mut xml = Writer::new_with_indent(Vec::new(), b' ', 2);

    write(&mut xml, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    write(&mut xml, Event::Start(BytesStart::new("QvxTableHeader")))?;

    text_element(&mut xml, "MajorVersion", &header.major_version.to_string())?;
    text_element(&mut xml, "MinorVersion", &header.minor_version.to_string())?;
    let created = header.created.to_rfc3339_opts(SecondsFormat::Secs, true);
    text_element(&mut xml, "CreateUtcTime", &created)?;
    text_element(&mut xml, "TableName", &header.table_name)?;
    text_element(
        &mut xml,
        "UsesSeparatorByte",
        bool_str(header.uses_separator_byte),
    )?;
    text_element(&mut xml, "BlockSize", &header.block_size.to_string())?;

    write(&mut xml, Event::Start(BytesStart::new("Fields")))?;
    for field in &header.fields {
        field_element(&mut xml, field)?;
    }
    write(&mut xml, Event::End(BytesEnd::new("Fields")))?;

    write(&mut xml, Event::End(BytesEnd::new("QvxTableHeader")))?;
    Ok(xml.into_inner())
}

fn field_element(xml: &mut Writer<Vec<u8>>, field: &QvxFieldHeader) -> Result<()> {
    write(xml, Event::Start(BytesStart::new("QvxFieldHeader")))?;
    text_element(xml, "FieldName", &field.name)?;
    text_element(xml, "Type", field.field_type.as_str())?;
    text_element(xml, "Extent", field.extent.as_str())?;
    text_element(
        xml,
        "NullRepresentation",
        field.null_representation.as_str(),
    )?;
    text_element(xml, "BigEndian", bool_str(field.big_endian))?;
    if let Some(code_page) = field.code_page {
        text_element(xml, "CodePage", &code_page.to_string())?;
    }
    text_element(xml, "ByteWidth", &field.byte_width.to_string())?;

    let attributes = &field.attributes;
    write(xml, Event::Start(BytesStart::new("FieldFormat")))?;
    text_element(xml, "Type", attributes.attr_type.as_str())?;
    if let Some(decimals) = attributes.decimals {
        text_element(xml, "nDec", &decimals.to_string())?;
    }
    if let Some(format) = &attributes.format {
        text_element(xml, "Fmt", format)?;
    }
    write(xml, Event::End(BytesEnd::new("FieldFormat")))?;

    write(xml, Event::End(BytesEnd::new("QvxFieldHeader")))
}

fn text_element(xml: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(xml, Event::Start(BytesStart::new(name)))?;
    write(xml, Event::Text(BytesText::new(text)))?;
    write(xml, Event::End(BytesEnd::new(name)))
}

fn write(xml: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    xml.write_event(event)
        .map_err(|e| QvxError::header_serialization(e.to_string()))
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
