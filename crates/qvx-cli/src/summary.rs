//! Terminal tables for field descriptors and write results.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qvx_writer::{QvxFieldHeader, QvxFieldType, QvxTableHeader, WriteSummary};

/// Build the field descriptor table for a header.
pub fn field_table(header: &QvxTableHeader) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Width"),
        header_cell("Extent"),
        header_cell("Byte order"),
        header_cell("Attribute"),
        header_cell("Format"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    for (index, field) in header.fields.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index),
            Cell::new(&field.name).add_attribute(Attribute::Bold),
            type_cell(field.field_type),
            width_cell(field),
            Cell::new(field.extent.as_str()),
            Cell::new(if field.big_endian { "big" } else { "little" }),
            Cell::new(attribute_text(field)),
            field
                .attributes
                .format
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table
}

/// Print the schema of a table without writing it.
pub fn print_schema(header: &QvxTableHeader) {
    println!("Table: {}", header.table_name);
    println!("{}", field_table(header));
}

/// Print the outcome of a write.
pub fn print_write_summary(path: &Path, summary: &WriteSummary) {
    println!("Output: {}", path.display());
    println!("{}", field_table(&summary.header));
    println!(
        "Wrote {} rows ({} body bytes) to table '{}'",
        summary.rows, summary.body_bytes, summary.header.table_name
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn attribute_text(field: &QvxFieldHeader) -> String {
    match field.attributes.decimals {
        Some(decimals) => format!("{}:{decimals}", field.attributes.attr_type),
        None => field.attributes.attr_type.to_string(),
    }
}

fn type_cell(field_type: QvxFieldType) -> Cell {
    let color = match field_type {
        QvxFieldType::SignedInteger | QvxFieldType::UnsignedInteger => Color::Blue,
        QvxFieldType::IeeeReal => Color::Magenta,
        QvxFieldType::Text => Color::Green,
        QvxFieldType::Dual => Color::Yellow,
    };
    Cell::new(field_type.as_str()).fg(color)
}

fn width_cell(field: &QvxFieldHeader) -> Cell {
    if field.field_type == QvxFieldType::Text {
        dim_cell("-")
    } else {
        Cell::new(field.byte_width)
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
