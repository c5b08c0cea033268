use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use qvx_writer::{
    OverwritePolicy, QvxSettings, QvxTableHeader, QvxWriterOptions, WriteSummary,
    build_table_header, default_table_name, write_qvx_file,
};
use qvx_cli::ingest::read_csv_table;

use crate::cli::{AttrArgs, SchemaArgs, WriteArgs};

/// Write the input CSV as a QVX file and return where it went.
pub fn run_write(args: &WriteArgs) -> Result<(PathBuf, WriteSummary)> {
    let span = info_span!("write", input = %args.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let settings = effective_settings(args)?;
    if let Some(path) = &args.save_settings {
        settings
            .save(path)
            .with_context(|| format!("save settings: {}", path.display()))?;
        info!(path = %path.display(), "saved settings");
    }

    let table = read_csv_table(&args.input)?;
    let summary = write_qvx_file(&table, &settings)
        .with_context(|| format!("write {}", settings.output_path.display()))?;
    info!(
        rows = summary.rows,
        elapsed_ms = start.elapsed().as_millis(),
        "write complete"
    );
    Ok((settings.output_path, summary))
}

/// Derive the header the input CSV would be written with.
pub fn run_schema(args: &SchemaArgs) -> Result<QvxTableHeader> {
    let table = read_csv_table(&args.input)?;
    let stem = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut options = QvxWriterOptions::new().with_table_name(default_table_name(Path::new(&stem)));
    for &(index, attr) in &args.attrs.attr {
        options = options.with_field_attribute(index, attr);
    }
    build_table_header(&table.columns, &options).context("build table header")
}

/// Settings from `--settings`, with command-line flags layered on top.
fn effective_settings(args: &WriteArgs) -> Result<QvxSettings> {
    let mut settings = match &args.settings {
        Some(path) => QvxSettings::load(path)
            .with_context(|| format!("load settings: {}", path.display()))?,
        None => QvxSettings::default(),
    };
    if let Some(output) = &args.output {
        settings.output_path.clone_from(output);
    }
    if settings.output_path.as_os_str().is_empty() {
        bail!("no output file given; pass --output or a settings file with outputPath");
    }
    if let Some(name) = &args.table_name {
        settings.table_name = Some(name.clone());
    }
    if args.big_endian {
        settings.big_endian = Some(true);
    }
    if args.separator_byte {
        settings.uses_separator_byte = true;
    }
    if args.overwrite {
        settings.overwrite_policy = OverwritePolicy::Overwrite;
    }
    apply_attrs(&mut settings, &args.attrs);
    Ok(settings)
}

fn apply_attrs(settings: &mut QvxSettings, attrs: &AttrArgs) {
    for &(index, attr) in &attrs.attr {
        settings.field_attributes.insert(index, attr);
    }
}
