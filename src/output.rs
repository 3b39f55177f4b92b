//! Output formatting and persistence for aggregate series.
//!
//! Supports pretty-printing, JSON serialization, and CSV export.

use anyhow::Result;
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, info};

use crate::aggregate::Series;
use csv::WriterBuilder;
use std::fs::File;

/// Logs a series as an aligned two-column table.
pub fn print_pretty<V: Display>(series: &Series<V>) {
    info!("{}", render_table(series));
}

/// Logs a series as pretty-printed JSON.
pub fn print_json<V: Serialize>(series: &Series<V>) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(series)?);
    Ok(())
}

/// Renders `bucket  value` lines under a header naming the series.
pub fn render_table<V: Display>(series: &Series<V>) -> String {
    let mut out = format!("{:>8}  {}\n", "bucket", series.name());
    for (key, value) in series.iter() {
        out.push_str(&format!("{:>8}  {}\n", key.to_string(), value));
    }
    out
}

/// Writes a series to a CSV file with header `bucket,<series name>`,
/// replacing any existing file.
pub fn write_csv<V: Display>(path: &str, series: &Series<V>) -> Result<()> {
    debug!(path, rows = series.len(), "Writing CSV");

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(["bucket", series.name()])?;
    for (key, value) in series.iter() {
        writer.write_record([key.to_string(), value.to_string()])?;
    }
    writer.flush()?;

    Ok(())
}
