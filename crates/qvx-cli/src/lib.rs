//! CLI library components for the QVX writer.

pub mod ingest;
pub mod logging;
