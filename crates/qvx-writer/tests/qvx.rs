use std::fs;

use chrono::{TimeZone, Utc};
use qvx_writer::{
    Column, DeclaredType, FieldAttrType, FieldAttributeOverride, HEADER_DELIMITER, OverwritePolicy,
    QvxError, QvxSettings, QvxTable, QvxWriter, QvxWriterOptions, write_qvx, write_qvx_file,
};

fn people() -> QvxTable {
    let mut table = QvxTable::with_columns(vec![Column::integer("Age"), Column::string("Name")]);
    table.add_row(["5", "Al"]);
    table.add_row(["", ""]);
    table
}

fn options() -> QvxWriterOptions {
    QvxWriterOptions::new()
        .with_table_name("People")
        .with_created(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap())
}

fn split(bytes: &[u8]) -> (&str, &[u8]) {
    let delimiter = bytes
        .iter()
        .position(|&b| b == HEADER_DELIMITER)
        .expect("header delimiter");
    let header = std::str::from_utf8(&bytes[..delimiter]).expect("utf-8 header");
    (header, &bytes[delimiter + 1..])
}

fn people_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&[0x00, 0x05, 0x00, 0x00, 0x00]);
    body.extend_from_slice(&[0x00, 0x41, 0x6C, 0x00]);
    body.push(0x01);
    body.extend_from_slice(&[0x00, 0x00]);
    body
}

#[test]
fn writes_body_without_separators() {
    let mut out = Vec::new();
    let summary = QvxWriter::with_options(&mut out, options())
        .write_table(&people())
        .expect("write");

    let (header, body) = split(&out);
    assert!(header.contains("<TableName>People</TableName>"));
    assert!(header.contains("<UsesSeparatorByte>false</UsesSeparatorByte>"));
    assert_eq!(body, people_body().as_slice());
    assert_eq!(summary.rows, 2);
    assert_eq!(summary.body_bytes, body.len() as u64);
}

#[test]
fn writes_body_with_separators() {
    let mut out = Vec::new();
    QvxWriter::with_options(&mut out, options().with_separator_byte(true))
        .write_table(&people())
        .expect("write");

    let (header, body) = split(&out);
    assert!(header.contains("<UsesSeparatorByte>true</UsesSeparatorByte>"));

    let mut expected = vec![0x1E];
    expected.extend_from_slice(&[0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x41, 0x6C, 0x00]);
    expected.push(0x1E);
    expected.extend_from_slice(&[0x01, 0x00, 0x00]);
    expected.push(0x1C);
    assert_eq!(body, expected.as_slice());
}

#[test]
fn header_describes_fields_in_order() {
    let mut table = QvxTable::with_columns(vec![
        Column::integer("Count").with_bounds(0, 100),
        Column::double("Price"),
        Column::new("Sold", DeclaredType::LocalDateTime),
        Column::string("Note"),
    ]);
    table.add_row(["1", "2.5", "2020-01-01T12:00:00", "x"]);

    let options = options()
        .with_big_endian(true)
        .with_field_attribute(1, FieldAttributeOverride::new(FieldAttrType::Fix).with_decimals(2))
        .with_field_attribute(2, FieldAttributeOverride::new(FieldAttrType::Timestamp));
    let mut out = Vec::new();
    let summary = QvxWriter::with_options(&mut out, options)
        .write_table(&table)
        .expect("write");

    let (header, body) = split(&out);
    let names: Vec<_> = ["Count", "Price", "Sold", "Note"]
        .iter()
        .map(|name| header.find(&format!("<FieldName>{name}</FieldName>")).expect(name))
        .collect();
    assert!(names.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(header.contains("<Type>QVX_UNSIGNED_INTEGER</Type>"));
    assert!(header.contains("<Type>QVX_IEEE_REAL</Type>"));
    assert!(header.contains("<Type>QVX_QV_DUAL</Type>"));
    assert!(header.contains("<Type>QVX_TEXT</Type>"));
    assert!(header.contains("<nDec>2</nDec>"));
    assert!(header.contains("<Fmt>M/D/YYYY hh:mm:ss TT</Fmt>"));

    let sold = &summary.header.fields[2];
    assert!(!sold.big_endian);
    assert!(summary.header.fields[0].big_endian);

    let mut expected = vec![0x00, 0x00, 0x00, 0x00, 0x01];
    expected.push(0x00);
    expected.extend_from_slice(&2.5f64.to_be_bytes());
    expected.push(0x02);
    expected.extend_from_slice(&43831.5f64.to_le_bytes());
    expected.extend_from_slice(&[0x00, b'x', 0x00]);
    assert_eq!(body, expected.as_slice());
}

#[test]
fn streams_rows_from_iterator() {
    let columns = vec![Column::integer("N")];
    let rows = (0..10_000).map(|n| vec![n.to_string()]);
    let mut out = Vec::new();
    let summary = QvxWriter::with_options(&mut out, options().with_buffer_capacity(64))
        .write_rows(&columns, rows)
        .expect("write");

    let (_, body) = split(&out);
    assert_eq!(summary.rows, 10_000);
    assert_eq!(body.len(), 10_000 * 5);
    assert_eq!(&body[5 * 9_999..], &[0x00, 0x0F, 0x27, 0x00, 0x00]);
}

#[test]
fn long_column_is_rejected_before_output() {
    let table = QvxTable::with_columns(vec![Column::new("Id", DeclaredType::Long)]);
    let mut out = Vec::new();
    let err = QvxWriter::new(&mut out).write_table(&table).unwrap_err();
    assert!(matches!(err, QvxError::UnsupportedType { .. }));
    assert!(out.is_empty());
}

#[test]
fn code_page_is_rejected_for_text() {
    let err = QvxWriter::with_options(Vec::new(), options().with_code_page(65001))
        .write_table(&people())
        .unwrap_err();
    assert!(matches!(
        err,
        QvxError::UnsupportedEncoding { ref field, code_page: 65001 } if field == "Name"
    ));
}

#[test]
fn write_qvx_creates_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("people.qvx");
    write_qvx(&path, &people(), &options()).expect("write");

    let bytes = fs::read(&path).expect("read back");
    let (header, body) = split(&bytes);
    assert!(header.starts_with("<?xml"));
    assert_eq!(body, people_body().as_slice());
}

#[test]
fn write_qvx_file_honors_overwrite_policy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("people.qvx");
    fs::write(&path, b"old").expect("seed file");

    let mut settings = QvxSettings::new(&path);
    let err = write_qvx_file(&people(), &settings).unwrap_err();
    assert!(matches!(err, QvxError::DestinationExists { .. }));
    assert_eq!(fs::read(&path).unwrap(), b"old");

    settings.overwrite_policy = OverwritePolicy::Overwrite;
    let summary = write_qvx_file(&people(), &settings).expect("overwrite");
    assert_eq!(summary.header.table_name, "People");
    assert_ne!(fs::read(&path).unwrap(), b"old");
}

#[test]
fn write_qvx_file_rejects_bad_destinations() {
    let dir = tempfile::tempdir().expect("tempdir");

    let settings = QvxSettings::new(dir.path());
    assert!(matches!(
        write_qvx_file(&people(), &settings).unwrap_err(),
        QvxError::InvalidDestination { .. }
    ));

    let settings = QvxSettings::new(dir.path().join("people.csv"));
    assert!(matches!(
        write_qvx_file(&people(), &settings).unwrap_err(),
        QvxError::InvalidDestination { .. }
    ));
    assert!(!dir.path().join("people.csv").exists());
}

#[test]
fn settings_round_trip_through_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");

    let mut settings = QvxSettings::new(dir.path().join("out.qvx"));
    settings.uses_separator_byte = true;
    settings
        .field_attributes
        .insert(0, FieldAttributeOverride::new(FieldAttrType::Date));
    settings.save(&path).expect("save");

    let loaded = QvxSettings::load(&path).expect("load");
    assert_eq!(loaded, settings);

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        QvxSettings::load(&path).unwrap_err(),
        QvxError::Settings(_)
    ));
}
