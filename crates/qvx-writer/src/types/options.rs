//! Writer options.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FieldAttrType;

/// Default write buffer capacity (1 MiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 1 << 20;

/// User-selected semantic attributes for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAttributeOverride {
    pub attr_type: FieldAttrType,
    /// Decimal places, recorded for FIX/REAL only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl FieldAttributeOverride {
    /// Override with no decimal count.
    #[must_use]
    pub const fn new(attr_type: FieldAttrType) -> Self {
        Self {
            attr_type,
            decimals: None,
        }
    }

    /// Set the decimal count.
    #[must_use]
    pub const fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

impl FromStr for FieldAttributeOverride {
    type Err = String;

    /// Parse `TYPE` or `TYPE:DECIMALS`, e.g. `DATE` or `FIX:2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (attr, decimals) = match s.split_once(':') {
            Some((attr, decimals)) => {
                let decimals = decimals
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| format!("invalid decimal count '{decimals}': {e}"))?;
                (attr, Some(decimals))
            }
            None => (s, None),
        };
        Ok(Self {
            attr_type: attr.parse()?,
            decimals,
        })
    }
}

/// Options for writing QVX files.
#[derive(Debug, Clone)]
pub struct QvxWriterOptions {
    /// Table name recorded in the header.
    pub table_name: String,
    /// Byte order for non-dual fields; `None` means little-endian.
    pub big_endian: Option<bool>,
    /// Emit record (0x1E) and file (0x1C) separator bytes.
    pub uses_separator_byte: bool,
    /// Semantic overrides keyed by zero-based column index.
    pub field_attributes: BTreeMap<usize, FieldAttributeOverride>,
    /// Requested code page for text fields; only `None` is supported.
    pub code_page: Option<u32>,
    /// Creation timestamp (default: current time).
    pub created: Option<DateTime<Utc>>,
    /// Body buffer capacity in bytes.
    pub buffer_capacity: usize,
}

impl Default for QvxWriterOptions {
    fn default() -> Self {
        Self {
            table_name: String::new(),
            big_endian: None,
            uses_separator_byte: false,
            field_attributes: BTreeMap::new(),
            code_page: None,
            created: None,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl QvxWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table name.
    #[must_use]
    pub fn with_table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Set the byte order.
    #[must_use]
    pub fn with_big_endian(mut self, big_endian: bool) -> Self {
        self.big_endian = Some(big_endian);
        self
    }

    /// Enable or disable separator bytes.
    #[must_use]
    pub fn with_separator_byte(mut self, enable: bool) -> Self {
        self.uses_separator_byte = enable;
        self
    }

    /// Set the semantic override for one column.
    #[must_use]
    pub fn with_field_attribute(mut self, column: usize, attr: FieldAttributeOverride) -> Self {
        self.field_attributes.insert(column, attr);
        self
    }

    /// Set the text code page.
    #[must_use]
    pub fn with_code_page(mut self, code_page: u32) -> Self {
        self.code_page = Some(code_page);
        self
    }

    /// Set the creation timestamp.
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the body buffer capacity.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Whether non-dual fields are written big-endian.
    #[must_use]
    pub fn is_big_endian(&self) -> bool {
        self.big_endian.unwrap_or(false)
    }

    /// Get the creation timestamp (current time if not set).
    #[must_use]
    pub fn get_created(&self) -> DateTime<Utc> {
        self.created.unwrap_or_else(Utc::now)
    }
}
