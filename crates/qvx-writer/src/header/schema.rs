//! Table header construction from column metadata and user overrides.

use tracing::{debug, warn};

use crate::error::{QvxError, Result};
use crate::types::{
    Column, DeclaredType, FieldAttributeOverride, FieldAttributes, QvxFieldHeader, QvxFieldType,
    QvxTableHeader, QvxWriterOptions,
};

/// Build the table header for `columns`.
///
/// Field order follows column order. Overrides for columns that do not exist
/// are ignored, and columns without an override get the `UNKNOWN` subtype.
///
/// # Errors
///
/// - [`QvxError::UnsupportedType`] for unrecognized declared types and for
///   integer columns whose bounds leave the 32-bit range.
/// - [`QvxError::UnsupportedEncoding`] when a code page is configured and
///   the table has text fields.
pub fn build_table_header(
    columns: &[Column],
    options: &QvxWriterOptions,
) -> Result<QvxTableHeader> {
    if let Some((&index, _)) = options.field_attributes.range(columns.len()..).next() {
        warn!(
            index,
            columns = columns.len(),
            "field attribute override refers to a missing column"
        );
    }

    let fields = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let attr = options
                .field_attributes
                .get(&index)
                .copied()
                .unwrap_or_default();
            build_field_header(column, attr, options)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QvxTableHeader::new(
        options.table_name.clone(),
        options.get_created(),
        options.uses_separator_byte,
        fields,
    ))
}

/// Build the descriptor for one column.
pub fn build_field_header(
    column: &Column,
    attr: FieldAttributeOverride,
    options: &QvxWriterOptions,
) -> Result<QvxFieldHeader> {
    // The declared type is checked even when a temporal override replaces it.
    let storage = storage_field(column)?;
    let field = if attr.attr_type.is_temporal() {
        QvxFieldHeader::dual(&column.name, attr.attr_type)
    } else {
        let mut attributes = FieldAttributes::new(attr.attr_type);
        if attr.attr_type.takes_decimals() {
            attributes.decimals = attr.decimals;
        }
        storage.with_attributes(attributes)
    };
    let field = field.with_big_endian(options.is_big_endian());

    if field.field_type == QvxFieldType::Text
        && let Some(code_page) = options.code_page
    {
        return Err(QvxError::unsupported_encoding(&column.name, code_page));
    }

    debug!(
        field = %field.name,
        field_type = %field.field_type,
        byte_width = field.byte_width,
        attr = %field.attributes.attr_type,
        big_endian = field.big_endian,
        "built field header"
    );
    Ok(field)
}

/// Map a declared column type to its storage type and width.
fn storage_field(column: &Column) -> Result<QvxFieldHeader> {
    match &column.declared_type {
        DeclaredType::Integer => {
            for bound in [column.lower_bound, column.upper_bound].into_iter().flatten() {
                if i32::try_from(bound).is_err() {
                    return Err(QvxError::unsupported_type(
                        &column.name,
                        format!("bound {bound} exceeds 32 bits; 64-bit integers are not supported"),
                    ));
                }
            }
            if column.lower_bound.is_some_and(|lower| lower >= 0) {
                Ok(QvxFieldHeader::unsigned_integer(&column.name))
            } else {
                Ok(QvxFieldHeader::signed_integer(&column.name))
            }
        }
        DeclaredType::Long => Err(QvxError::unsupported_type(
            &column.name,
            "64-bit integers are not supported",
        )),
        DeclaredType::Double => Ok(QvxFieldHeader::real(&column.name, 8)),
        declared if declared.is_textual() => Ok(QvxFieldHeader::text(&column.name)),
        declared => Err(QvxError::unsupported_type(
            &column.name,
            format!("unrecognized column type '{declared}'"),
        )),
    }
}
