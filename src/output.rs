//! Output rendering
//!
//! Serializes projections to a structured text format.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;

use crate::error::Result;
use crate::secrets::Projection;

/// Printed instead of an empty collection
pub const EMPTY_MARKER: &str = "[]";

/// Machine-readable output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Write `projections` to `out` in `format`
pub fn render<W: Write>(
    out: &mut W,
    projections: &[Projection],
    format: OutputFormat,
) -> Result<()> {
    if projections.is_empty() {
        writeln!(out, "{}", EMPTY_MARKER)?;
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = Serializer::with_formatter(&mut *out, formatter);
            projections.serialize(&mut serializer)?;
            writeln!(out)?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut *out, projections)?;
        }
    }
    out.flush()?;
    Ok(())
}
