//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use qvx_writer::FieldAttributeOverride;

#[derive(Parser)]
#[command(
    name = "qvx",
    version,
    about = "Write QVX (QlikView data exchange) files from CSV tables",
    long_about = "Convert a CSV table into a QVX file for QlikView and Qlik Sense.\n\n\
                  Column types are inferred from the data. Use --attr to mark\n\
                  columns as dates, times or timestamps, or to record decimals."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a CSV file as a QVX file.
    Write(WriteArgs),

    /// Show the QVX fields that would be written for a CSV file.
    Schema(SchemaArgs),
}

#[derive(Parser)]
pub struct WriteArgs {
    /// CSV file with a header row.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output .qvx file (required unless given by --settings).
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Table name (default: output file name without extension).
    #[arg(long = "table-name", value_name = "NAME")]
    pub table_name: Option<String>,

    /// Write numeric fields big-endian.
    #[arg(long = "big-endian")]
    pub big_endian: bool,

    /// Write record and file separator bytes.
    #[arg(long = "separator-byte")]
    pub separator_byte: bool,

    /// Replace the output file if it exists.
    #[arg(long = "overwrite")]
    pub overwrite: bool,

    #[command(flatten)]
    pub attrs: AttrArgs,

    /// Load settings from a JSON file; flags given here take precedence.
    #[arg(long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Save the effective settings to a JSON file.
    #[arg(long = "save-settings", value_name = "FILE")]
    pub save_settings: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SchemaArgs {
    /// CSV file with a header row.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[command(flatten)]
    pub attrs: AttrArgs,
}

#[derive(Args)]
pub struct AttrArgs {
    /// Field attribute for a zero-based column, e.g. `2=DATE` or `1=FIX:2`.
    ///
    /// Types: UNKNOWN, FIX, REAL, DATE, TIME, INTERVAL, TIMESTAMP.
    #[arg(long = "attr", value_name = "INDEX=TYPE[:DEC]", value_parser = parse_attr)]
    pub attr: Vec<(usize, FieldAttributeOverride)>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Parse `INDEX=TYPE[:DEC]`.
fn parse_attr(value: &str) -> Result<(usize, FieldAttributeOverride), String> {
    let (index, attr) = value
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=TYPE[:DEC], got '{value}'"))?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid column index '{index}': {e}"))?;
    Ok((index, attr.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use qvx_writer::FieldAttrType;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_attr() {
        let (index, attr) = parse_attr("2=date").unwrap();
        assert_eq!(index, 2);
        assert_eq!(attr.attr_type, FieldAttrType::Date);

        let (index, attr) = parse_attr("0=FIX:3").unwrap();
        assert_eq!(index, 0);
        assert_eq!(attr.decimals, Some(3));

        assert!(parse_attr("DATE").is_err());
        assert!(parse_attr("x=DATE").is_err());
        assert!(parse_attr("1=WHEN").is_err());
    }

    #[test]
    fn test_write_args() {
        let cli = Cli::try_parse_from([
            "qvx",
            "write",
            "in.csv",
            "-o",
            "out.qvx",
            "--separator-byte",
            "--attr",
            "1=TIMESTAMP",
            "--attr",
            "2=REAL:2",
        ])
        .unwrap();
        let Command::Write(args) = cli.command else {
            panic!("expected write command");
        };
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out.qvx")));
        assert!(args.separator_byte);
        assert!(!args.big_endian);
        assert_eq!(args.attrs.attr.len(), 2);
    }
}
