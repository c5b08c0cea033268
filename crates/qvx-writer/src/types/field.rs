//! QVX header model: table header, field headers and their enumerations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// QVX header major version.
pub const MAJOR_VERSION: u32 = 1;

/// QVX header minor version.
pub const MINOR_VERSION: u32 = 0;

/// Block size recorded in the header. Multi-block files are not produced.
pub const BLOCK_SIZE: u32 = 1;

/// On-disk storage type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QvxFieldType {
    /// Two's-complement integer.
    SignedInteger,
    /// Unsigned integer.
    UnsignedInteger,
    /// IEEE-754 single or double.
    IeeeReal,
    /// Zero-terminated single-byte text.
    Text,
    /// Packed dual value; only used for date/time/interval/timestamp fields.
    Dual,
}

impl QvxFieldType {
    /// Name used in the header document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignedInteger => "QVX_SIGNED_INTEGER",
            Self::UnsignedInteger => "QVX_UNSIGNED_INTEGER",
            Self::IeeeReal => "QVX_IEEE_REAL",
            Self::Text => "QVX_TEXT",
            Self::Dual => "QVX_QV_DUAL",
        }
    }

    /// Whether values of this type are integers.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::SignedInteger | Self::UnsignedInteger)
    }
}

impl fmt::Display for QvxFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the byte length of a field value is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldExtent {
    /// Fixed byte width.
    Fix,
    /// Terminated by a zero byte (text only).
    ZeroTerminated,
    /// Dual special layout (dual only).
    Special,
}

impl FieldExtent {
    /// Name used in the header document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fix => "QVX_FIX",
            Self::ZeroTerminated => "QVX_ZERO_TERMINATED",
            Self::Special => "QVX_QV_SPECIAL",
        }
    }

    /// Extent implied by a field type.
    #[must_use]
    pub const fn for_type(field_type: QvxFieldType) -> Self {
        match field_type {
            QvxFieldType::Text => Self::ZeroTerminated,
            QvxFieldType::Dual => Self::Special,
            QvxFieldType::SignedInteger | QvxFieldType::UnsignedInteger | QvxFieldType::IeeeReal => {
                Self::Fix
            }
        }
    }
}

/// How missing values are represented in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullRepresentation {
    /// No flag byte; a value is always present.
    Never,
    /// Leading flag byte; value bytes are suppressed for nulls.
    #[default]
    FlagSuppressData,
}

impl NullRepresentation {
    /// Name used in the header document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Never => "QVX_NULL_NEVER",
            Self::FlagSuppressData => "QVX_NULL_FLAG_SUPPRESS_DATA",
        }
    }
}

/// Leading byte of a dual value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QvSpecialFlag {
    /// Null dual; no value bytes follow.
    Null = 0,
    /// An 8-byte double follows.
    Double = 2,
}

impl QvSpecialFlag {
    /// Flag for a cell: null for empty text, double otherwise.
    #[must_use]
    pub fn for_value(value: &str) -> Self {
        if value.is_empty() {
            Self::Null
        } else {
            Self::Double
        }
    }

    /// The raw flag byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Semantic subtype of a field, as selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldAttrType {
    #[default]
    Unknown,
    Fix,
    Real,
    Date,
    Time,
    Interval,
    Timestamp,
}

impl FieldAttrType {
    /// All attribute types, in header order.
    pub const ALL: [Self; 7] = [
        Self::Unknown,
        Self::Fix,
        Self::Real,
        Self::Date,
        Self::Time,
        Self::Interval,
        Self::Timestamp,
    ];

    /// Name used in the header document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Fix => "FIX",
            Self::Real => "REAL",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Interval => "INTERVAL",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// Whether fields of this subtype are stored as duals.
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::Interval | Self::Timestamp
        )
    }

    /// Whether this subtype carries a decimal-places count.
    #[must_use]
    pub const fn takes_decimals(self) -> bool {
        matches!(self, Self::Fix | Self::Real)
    }

    /// Display format written for temporal subtypes.
    #[must_use]
    pub const fn display_format(self) -> Option<&'static str> {
        match self {
            Self::Date => Some("M/D/YYYY"),
            Self::Time | Self::Interval => Some("hh:mm:ss TT"),
            Self::Timestamp => Some("M/D/YYYY hh:mm:ss TT"),
            Self::Unknown | Self::Fix | Self::Real => None,
        }
    }
}

impl fmt::Display for FieldAttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldAttrType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown field attribute type: {s}"))
    }
}

/// Field attribute descriptor (`FieldFormat` in the header document).
///
/// Purely advisory; none of it changes the body bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldAttributes {
    pub attr_type: FieldAttrType,
    /// Decimal places, FIX/REAL only.
    pub decimals: Option<u32>,
    /// Display format, temporal subtypes only.
    pub format: Option<String>,
}

impl FieldAttributes {
    /// Attributes for a subtype, with its standard display format.
    #[must_use]
    pub fn new(attr_type: FieldAttrType) -> Self {
        Self {
            attr_type,
            decimals: None,
            format: attr_type.display_format().map(str::to_string),
        }
    }
}

/// Per-column encoding descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QvxFieldHeader {
    pub name: String,
    pub field_type: QvxFieldType,
    /// Value width in bytes; 0 for text.
    pub byte_width: u32,
    pub extent: FieldExtent,
    pub null_representation: NullRepresentation,
    pub big_endian: bool,
    /// Requested code page; `None` is the single-byte default.
    pub code_page: Option<u32>,
    pub attributes: FieldAttributes,
}

impl QvxFieldHeader {
    fn with_type(name: impl Into<String>, field_type: QvxFieldType, byte_width: u32) -> Self {
        Self {
            name: name.into(),
            field_type,
            byte_width,
            extent: FieldExtent::for_type(field_type),
            null_representation: NullRepresentation::FlagSuppressData,
            big_endian: false,
            code_page: None,
            attributes: FieldAttributes::default(),
        }
    }

    /// 4-byte signed integer field.
    #[must_use]
    pub fn signed_integer(name: impl Into<String>) -> Self {
        Self::with_type(name, QvxFieldType::SignedInteger, 4)
    }

    /// 4-byte unsigned integer field.
    #[must_use]
    pub fn unsigned_integer(name: impl Into<String>) -> Self {
        Self::with_type(name, QvxFieldType::UnsignedInteger, 4)
    }

    /// IEEE real field of the given width (4 or 8).
    #[must_use]
    pub fn real(name: impl Into<String>, byte_width: u32) -> Self {
        Self::with_type(name, QvxFieldType::IeeeReal, byte_width)
    }

    /// Zero-terminated text field.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_type(name, QvxFieldType::Text, 0)
    }

    /// Dual field for a temporal subtype. Always little-endian.
    #[must_use]
    pub fn dual(name: impl Into<String>, attr_type: FieldAttrType) -> Self {
        let mut field = Self::with_type(name, QvxFieldType::Dual, 8);
        field.attributes = FieldAttributes::new(attr_type);
        field
    }

    /// Set the byte order. Ignored for dual fields.
    #[must_use]
    pub fn with_big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = big_endian && self.field_type != QvxFieldType::Dual;
        self
    }

    /// Set the null representation.
    #[must_use]
    pub fn with_null_representation(mut self, null_representation: NullRepresentation) -> Self {
        self.null_representation = null_representation;
        self
    }

    /// Set the code page.
    #[must_use]
    pub fn with_code_page(mut self, code_page: u32) -> Self {
        self.code_page = Some(code_page);
        self
    }

    /// Set the field attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: FieldAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

/// Table header; one per file, written before the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QvxTableHeader {
    pub major_version: u32,
    pub minor_version: u32,
    pub created: DateTime<Utc>,
    pub table_name: String,
    pub uses_separator_byte: bool,
    pub block_size: u32,
    pub fields: Vec<QvxFieldHeader>,
}

impl QvxTableHeader {
    /// Create a version 1.0 header.
    #[must_use]
    pub fn new(
        table_name: impl Into<String>,
        created: DateTime<Utc>,
        uses_separator_byte: bool,
        fields: Vec<QvxFieldHeader>,
    ) -> Self {
        Self {
            major_version: MAJOR_VERSION,
            minor_version: MINOR_VERSION,
            created,
            table_name: table_name.into(),
            uses_separator_byte,
            block_size: BLOCK_SIZE,
            fields,
        }
    }

    /// Number of fields.
    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }
}
