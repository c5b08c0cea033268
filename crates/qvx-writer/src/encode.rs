//! Cell encoding: one cell's text to its exact body bytes.
//!
//! # Layout per field
//!
//! | Type              | Null flag byte | Value bytes                          |
//! |-------------------|----------------|--------------------------------------|
//! | integer, real     | 1 = null       | 4/8 bytes, field byte order          |
//! | text              | always 0       | single-byte chars, then 0x00         |
//! | dual              | 0x00 / 0x02    | 8-byte little-endian double          |
//!
//! With [`NullRepresentation::Never`] the flag byte is omitted.

use std::str::FromStr;

use crate::error::{QvxError, Result};
use crate::temporal::{TemporalError, to_fractional_days};
use crate::types::{NullRepresentation, QvSpecialFlag, QvxFieldHeader, QvxFieldType};

const NULL_FLAG: u8 = 1;
const PRESENT_FLAG: u8 = 0;
const TEXT_TERMINATOR: u8 = 0;

/// Byte written for characters outside the single-byte range, and for NUL
/// which would end the value early.
const UNMAPPABLE_CHAR: u8 = b'?';

/// Encode one cell, including its null or special flag.
///
/// An empty string is a missing value, except for text fields where it is
/// an ordinary zero-length string.
pub fn encode_cell(value: &str, field: &QvxFieldHeader) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(1 + field.byte_width as usize + value.len());
    encode_cell_into(value, field, &mut out)?;
    Ok(out)
}

/// Encode one cell, appending to `out`.
///
/// On error `out` may hold a partial encoding.
pub fn encode_cell_into(value: &str, field: &QvxFieldHeader, out: &mut Vec<u8>) -> Result<()> {
    match field.null_representation {
        NullRepresentation::Never => encode_value_into(value, field, out),
        NullRepresentation::FlagSuppressData if field.field_type == QvxFieldType::Dual => {
            let flag = QvSpecialFlag::for_value(value);
            out.push(flag.byte());
            match flag {
                QvSpecialFlag::Null => Ok(()),
                QvSpecialFlag::Double => encode_value_into(value, field, out),
            }
        }
        NullRepresentation::FlagSuppressData => {
            if value.is_empty() && field.field_type != QvxFieldType::Text {
                out.push(NULL_FLAG);
                Ok(())
            } else {
                out.push(PRESENT_FLAG);
                encode_value_into(value, field, out)
            }
        }
    }
}

/// Encode a value without any flag byte.
pub fn encode_value(value: &str, field: &QvxFieldHeader) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_value_into(value, field, &mut out)?;
    Ok(out)
}

fn encode_value_into(value: &str, field: &QvxFieldHeader, out: &mut Vec<u8>) -> Result<()> {
    match (field.field_type, field.byte_width) {
        (QvxFieldType::SignedInteger, 4) => push_fixed::<i32>(value, field, out),
        (QvxFieldType::SignedInteger, 8) => push_fixed::<i64>(value, field, out),
        (QvxFieldType::UnsignedInteger, 4) => push_fixed::<u32>(value, field, out),
        (QvxFieldType::UnsignedInteger, 8) => push_fixed::<u64>(value, field, out),
        (QvxFieldType::IeeeReal, 4) => push_fixed::<f32>(value, field, out),
        (QvxFieldType::IeeeReal, 8) => push_fixed::<f64>(value, field, out),
        (QvxFieldType::Dual, _) => {
            let days = to_fractional_days(field.attributes.attr_type, value)
                .map_err(|e| temporal_error(e, field, value))?;
            out.extend_from_slice(&days.to_le_bytes());
            Ok(())
        }
        (QvxFieldType::Text, _) => encode_text(value, field, out),
        (field_type, width) => Err(QvxError::unsupported_type(
            &field.name,
            format!("{field_type} with byte width {width}"),
        )),
    }
}

/// Zero-terminated single-byte text.
fn encode_text(value: &str, field: &QvxFieldHeader, out: &mut Vec<u8>) -> Result<()> {
    if let Some(code_page) = field.code_page {
        return Err(QvxError::unsupported_encoding(&field.name, code_page));
    }
    out.extend(
        value
            .chars()
            .map(|ch| match u8::try_from(ch) {
                Ok(TEXT_TERMINATOR) | Err(_) => UNMAPPABLE_CHAR,
                Ok(byte) => byte,
            }),
    );
    out.push(TEXT_TERMINATOR);
    Ok(())
}

fn temporal_error(err: TemporalError, field: &QvxFieldHeader, value: &str) -> QvxError {
    match err {
        TemporalError::Malformed { reason, .. } => {
            QvxError::malformed_value(&field.name, value, reason)
        }
        TemporalError::UnknownSubtype(subtype) => QvxError::UnknownAttributeSubtype { subtype },
    }
}

/// Fixed-width numbers with both byte orders.
trait FixedWidth: FromStr {
    type Bytes: AsRef<[u8]>;

    fn to_be(self) -> Self::Bytes;
    fn to_le(self) -> Self::Bytes;
}

macro_rules! impl_fixed_width {
    ($($ty:ty),*) => {
        $(
            impl FixedWidth for $ty {
                type Bytes = [u8; size_of::<$ty>()];

                fn to_be(self) -> Self::Bytes {
                    self.to_be_bytes()
                }

                fn to_le(self) -> Self::Bytes {
                    self.to_le_bytes()
                }
            }
        )*
    };
}

impl_fixed_width!(i32, i64, u32, u64, f32, f64);

fn push_fixed<T>(value: &str, field: &QvxFieldHeader, out: &mut Vec<u8>) -> Result<()>
where
    T: FixedWidth,
    T::Err: std::fmt::Display,
{
    let parsed: T = value
        .parse()
        .map_err(|e: T::Err| QvxError::malformed_value(&field.name, value, e.to_string()))?;
    if field.big_endian {
        out.extend_from_slice(parsed.to_be().as_ref());
    } else {
        out.extend_from_slice(parsed.to_le().as_ref());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldAttrType;

    #[test]
    fn test_signed_integer_little_endian() {
        let field = QvxFieldHeader::signed_integer("Age");
        assert_eq!(encode_cell("5", &field).unwrap(), vec![0x00, 0x05, 0x00, 0x00, 0x00]);
        assert_eq!(
            encode_cell("-2", &field).unwrap(),
            vec![0x00, 0xFE, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_signed_integer_big_endian() {
        let field = QvxFieldHeader::signed_integer("Age").with_big_endian(true);
        assert_eq!(
            encode_cell("258", &field).unwrap(),
            vec![0x00, 0x00, 0x00, 0x01, 0x02]
        );
    }

    #[test]
    fn test_null_integer_is_flag_only() {
        let field = QvxFieldHeader::signed_integer("Age");
        assert_eq!(encode_cell("", &field).unwrap(), vec![0x01]);
        let field = QvxFieldHeader::real("Score", 8);
        assert_eq!(encode_cell("", &field).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_real_widths() {
        let field = QvxFieldHeader::real("X", 8);
        let mut expected = vec![0x00];
        expected.extend_from_slice(&1.5f64.to_le_bytes());
        assert_eq!(encode_cell("1.5", &field).unwrap(), expected);

        let field = QvxFieldHeader::real("X", 4).with_big_endian(true);
        let mut expected = vec![0x00];
        expected.extend_from_slice(&1.5f32.to_be_bytes());
        assert_eq!(encode_cell("1.5", &field).unwrap(), expected);
    }

    #[test]
    fn test_text() {
        let field = QvxFieldHeader::text("Name");
        assert_eq!(encode_value("", &field).unwrap(), vec![0x00]);
        assert_eq!(encode_value("AB", &field).unwrap(), vec![0x41, 0x42, 0x00]);
        // Empty text is a value, not a null.
        assert_eq!(encode_cell("", &field).unwrap(), vec![0x00, 0x00]);
        assert_eq!(
            encode_cell("Al", &field).unwrap(),
            vec![0x00, 0x41, 0x6C, 0x00]
        );
    }

    #[test]
    fn test_text_single_byte_mapping() {
        let field = QvxFieldHeader::text("Name");
        assert_eq!(encode_value("é", &field).unwrap(), vec![0xE9, 0x00]);
        assert_eq!(encode_value("€", &field).unwrap(), vec![b'?', 0x00]);
    }

    #[test]
    fn test_text_embedded_nul_does_not_terminate() {
        let field = QvxFieldHeader::text("Name");
        assert_eq!(
            encode_cell("A\0B", &field).unwrap(),
            vec![0x00, 0x41, b'?', 0x42, 0x00]
        );
    }

    #[test]
    fn test_text_code_page_rejected() {
        let field = QvxFieldHeader::text("Name").with_code_page(1200);
        let err = encode_cell("AB", &field).unwrap_err();
        assert!(matches!(err, QvxError::UnsupportedEncoding { code_page: 1200, .. }));
    }

    #[test]
    fn test_dual_values() {
        let field = QvxFieldHeader::dual("Born", FieldAttrType::Date);
        assert_eq!(encode_cell("", &field).unwrap(), vec![0x00]);

        let mut expected = vec![0x02];
        expected.extend_from_slice(&25569.0f64.to_le_bytes());
        assert_eq!(encode_cell("1970-01-01", &field).unwrap(), expected);
    }

    #[test]
    fn test_dual_ignores_big_endian_flag() {
        let mut field = QvxFieldHeader::dual("At", FieldAttrType::Time);
        field.big_endian = true;
        let mut expected = vec![0x02];
        expected.extend_from_slice(&0.5f64.to_le_bytes());
        assert_eq!(encode_cell("12:00:00", &field).unwrap(), expected);
    }

    #[test]
    fn test_dual_with_non_temporal_subtype() {
        let mut field = QvxFieldHeader::dual("Odd", FieldAttrType::Date);
        field.attributes.attr_type = FieldAttrType::Fix;
        let err = encode_cell("2020-01-01", &field).unwrap_err();
        assert!(matches!(
            err,
            QvxError::UnknownAttributeSubtype {
                subtype: FieldAttrType::Fix
            }
        ));
    }

    #[test]
    fn test_never_null_representation() {
        let field = QvxFieldHeader::signed_integer("N")
            .with_null_representation(NullRepresentation::Never);
        assert_eq!(encode_cell("1", &field).unwrap(), vec![0x01, 0x00, 0x00, 0x00]);
        assert!(encode_cell("", &field).is_err());
    }

    #[test]
    fn test_malformed_values() {
        let field = QvxFieldHeader::signed_integer("Age");
        let err = encode_cell("abc", &field).unwrap_err();
        assert!(matches!(
            err,
            QvxError::MalformedValue { ref field, ref value, .. } if field == "Age" && value == "abc"
        ));

        let field = QvxFieldHeader::unsigned_integer("Count");
        assert!(encode_cell("-1", &field).is_err());

        let field = QvxFieldHeader::dual("Born", FieldAttrType::Date);
        assert!(matches!(
            encode_cell("2020-99-01", &field).unwrap_err(),
            QvxError::MalformedValue { .. }
        ));
    }

    #[test]
    fn test_unsupported_width() {
        let mut field = QvxFieldHeader::signed_integer("Small");
        field.byte_width = 2;
        assert!(matches!(
            encode_cell("1", &field).unwrap_err(),
            QvxError::UnsupportedType { .. }
        ));
    }
}
