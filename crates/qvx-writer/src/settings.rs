//! Persisted writer settings and output destination checks.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QvxError, Result};
use crate::types::{FieldAttributeOverride, QvxTable, QvxWriterOptions};
use crate::writer::{QvxWriter, WriteSummary};

/// File extension required for output files.
pub const QVX_EXTENSION: &str = "qvx";

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverwritePolicy {
    /// Refuse to write.
    #[default]
    Abort,
    /// Replace the file.
    Overwrite,
}

/// Writer settings as saved between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QvxSettings {
    pub output_path: PathBuf,
    pub overwrite_policy: OverwritePolicy,
    /// Table name; derived from the output file name when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_endian: Option<bool>,
    pub uses_separator_byte: bool,
    /// Overrides keyed by zero-based column index.
    pub field_attributes: BTreeMap<usize, FieldAttributeOverride>,
}

impl QvxSettings {
    /// Settings for writing to `output_path` with defaults otherwise.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Configured table name, or one derived from the output path.
    #[must_use]
    pub fn resolved_table_name(&self) -> String {
        match &self.table_name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => default_table_name(&self.output_path),
        }
    }

    /// Writer options for these settings.
    #[must_use]
    pub fn to_writer_options(&self) -> QvxWriterOptions {
        QvxWriterOptions {
            table_name: self.resolved_table_name(),
            big_endian: self.big_endian,
            uses_separator_byte: self.uses_separator_byte,
            field_attributes: self.field_attributes.clone(),
            ..QvxWriterOptions::default()
        }
    }
}

/// Check that `path` can receive a QVX file under `policy`.
///
/// # Errors
///
/// - [`QvxError::InvalidDestination`] if the path is a directory or lacks
///   the `.qvx` extension.
/// - [`QvxError::DestinationExists`] if the file exists and the policy is
///   [`OverwritePolicy::Abort`].
pub fn validate_destination(path: &Path, policy: OverwritePolicy) -> Result<()> {
    if path.is_dir() {
        return Err(QvxError::invalid_destination(path, "path is a directory"));
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some(QVX_EXTENSION) {
        return Err(QvxError::invalid_destination(
            path,
            "expected a .qvx file extension",
        ));
    }
    if path.exists() && policy == OverwritePolicy::Abort {
        return Err(QvxError::DestinationExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Table name derived from a file name: `.qvx` removed, first letter
/// upper-cased.
#[must_use]
pub fn default_table_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(".qvx")
        .unwrap_or(file_name.as_str());

    let mut chars = stem.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Validate the destination in `settings`, create the file, and write `table`.
pub fn write_qvx_file(table: &QvxTable, settings: &QvxSettings) -> Result<WriteSummary> {
    validate_destination(&settings.output_path, settings.overwrite_policy)?;
    QvxWriter::create_with_options(&settings.output_path, settings.to_writer_options())?
        .write_table(table)
}
