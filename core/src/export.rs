//! Streaming CSV export of truth tables.
//!
//! Rows are written in chunks. Between chunks the exporter checks a
//! [`CancelToken`] and reports progress, so a caller can drive a progress bar
//! or abort a multi-gigabyte export. File exports go through a
//! [`PendingFile`] in the destination directory and only appear under their
//! final name once every row is written.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use circuitry_utils::{AtomicWriteOptions, PendingFile};
use thiserror::Error;

use crate::truth_table::TruthTable;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write truth table: {0}")]
    Io(#[from] io::Error),
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub rows_done: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Completed { rows: u64 },
    /// Stopped at a chunk boundary; `rows` were written before the stop.
    Cancelled { rows: u64 },
}

/// Write the header and every row of `table` as CSV.
///
/// `progress` runs after each chunk of `chunk_rows` rows.
pub fn export_csv<W: Write>(
    table: &mut TruthTable,
    writer: &mut W,
    chunk_rows: usize,
    cancel: &CancelToken,
    mut progress: impl FnMut(Progress),
) -> Result<ExportOutcome, ExportError> {
    let total = table.row_count();
    let chunk = chunk_rows.max(1) as u64;
    let mut line = String::new();

    write_record(writer, &mut line, table.headers())?;

    let mut done = 0u64;
    while done < total {
        if cancel.is_cancelled() {
            tracing::debug!(rows = done, total, "Truth table export cancelled");
            return Ok(ExportOutcome::Cancelled { rows: done });
        }
        let end = done.saturating_add(chunk).min(total);
        for row in table.rows_in(done..end) {
            line.clear();
            for (i, bit) in row.cells().enumerate() {
                if i > 0 {
                    line.push(',');
                }
                line.push(if bit { '1' } else { '0' });
            }
            line.push('\n');
            writer.write_all(line.as_bytes())?;
        }
        done = end;
        progress(Progress {
            rows_done: done,
            total,
        });
    }

    writer.flush()?;
    Ok(ExportOutcome::Completed { rows: total })
}

/// Export to `dir/file_name`, creating `dir` if needed.
///
/// Output streams into a temp file inside `dir`; it replaces `file_name` only
/// on completion and is removed on cancellation or error.
pub fn export_csv_file(
    table: &mut TruthTable,
    dir: &Path,
    file_name: &str,
    chunk_rows: usize,
    cancel: &CancelToken,
    progress: impl FnMut(Progress),
) -> Result<ExportOutcome, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let mut pending = PendingFile::create_in(dir)?;

    let outcome = export_csv(table, &mut pending, chunk_rows, cancel, progress)?;
    match outcome {
        ExportOutcome::Completed { rows } => {
            pending.commit(&path, AtomicWriteOptions::default())?;
            tracing::info!(path = %path.display(), rows, "Exported truth table");
        }
        ExportOutcome::Cancelled { rows } => {
            if let Err(e) = pending.discard() {
                tracing::warn!("Failed to remove partial export: {e}");
            }
            tracing::info!(path = %path.display(), rows, "Export cancelled; partial file removed");
        }
    }
    Ok(outcome)
}

/// The whole table as a CSV string, for clipboard-sized tables.
#[must_use]
pub fn to_csv_string(table: &mut TruthTable) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail and nothing cancels the token.
    let _ = export_csv(table, &mut buf, usize::MAX, &CancelToken::new(), |_| {});
    String::from_utf8_lossy(&buf).into_owned()
}

/// `truth_table_<first output>.csv`, with characters unsafe in file names
/// replaced by `_`.
#[must_use]
pub fn default_file_name(table: &TruthTable) -> String {
    let name = table
        .output_columns()
        .first()
        .map_or("LED", |c| c.header.as_str());
    let safe: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("truth_table_{safe}.csv")
}

fn write_record<'a, W: Write>(
    writer: &mut W,
    line: &mut String,
    fields: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    line.clear();
    for (i, field) in fields.enumerate() {
        if i > 0 {
            line.push(',');
        }
        push_field(line, field);
    }
    line.push('\n');
    writer.write_all(line.as_bytes())
}

/// Quote a field when it contains a delimiter, quote or line break.
fn push_field(line: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        line.push('"');
        line.push_str(&field.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(field);
    }
}
