//! Producer-side table model: column descriptors and text rows.

use std::fmt;

/// Declared type of a source column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    /// 32-bit integer; domain bounds pick signed vs unsigned.
    Integer,
    /// 64-bit integer. Never encodable.
    Long,
    /// Double precision float.
    Double,
    /// Plain text.
    String,
    /// Local date, written as text unless overridden.
    LocalDate,
    /// Local time, written as text unless overridden.
    LocalTime,
    /// Local date-time, written as text unless overridden.
    LocalDateTime,
    /// Zoned date-time, written as text unless overridden.
    DateAndTime,
    /// Any other host type.
    Other(String),
}

impl DeclaredType {
    /// Whether the type is carried as text in the body.
    #[must_use]
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            Self::String
                | Self::LocalDate
                | Self::LocalTime
                | Self::LocalDateTime
                | Self::DateAndTime
        )
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("Number (integer)"),
            Self::Long => f.write_str("Number (long)"),
            Self::Double => f.write_str("Number (double)"),
            Self::String => f.write_str("String"),
            Self::LocalDate => f.write_str("Local Date"),
            Self::LocalTime => f.write_str("Local Time"),
            Self::LocalDateTime => f.write_str("Local Date Time"),
            Self::DateAndTime => f.write_str("Date and Time"),
            Self::Other(name) => f.write_str(name),
        }
    }
}

/// Column descriptor supplied by the host table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub declared_type: DeclaredType,
    /// Smallest value observed or declared, integer columns only.
    pub lower_bound: Option<i64>,
    /// Largest value observed or declared, integer columns only.
    pub upper_bound: Option<i64>,
}

impl Column {
    /// Create a column with no domain bounds.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: DeclaredType) -> Self {
        Self {
            name: name.into(),
            declared_type,
            lower_bound: None,
            upper_bound: None,
        }
    }

    /// Integer column.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Integer)
    }

    /// Double column.
    #[must_use]
    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::Double)
    }

    /// Text column.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, DeclaredType::String)
    }

    /// Set the domain bounds.
    #[must_use]
    pub fn with_bounds(mut self, lower: i64, upper: i64) -> Self {
        self.lower_bound = Some(lower);
        self.upper_bound = Some(upper);
        self
    }
}

/// In-memory table: columns plus rows of cell text.
///
/// An empty string is a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QvxTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl QvxTable {
    /// Create a table with the given columns and no rows.
    #[must_use]
    pub fn with_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_row() {
        let mut table = QvxTable::with_columns(vec![Column::integer("Age"), Column::string("Name")]);
        table.add_row(["5", "Al"]);
        table.add_row(vec![String::new(), String::new()]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.num_columns(), 2);
        assert_eq!(table.rows[0], vec!["5".to_string(), "Al".to_string()]);
    }

    #[test]
    fn test_textual_types() {
        assert!(DeclaredType::LocalDate.is_textual());
        assert!(DeclaredType::String.is_textual());
        assert!(!DeclaredType::Double.is_textual());
        assert!(!DeclaredType::Other("Boolean".into()).is_textual());
    }
}
