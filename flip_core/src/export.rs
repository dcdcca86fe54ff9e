//! CSV export of the session log.
//!
//! Rolls the JSONL session log up into an append-only CSV file and
//! archives the processed log, with ordering that prevents data loss: the
//! CSV is fsynced before the log is renamed away.

use crate::session_log::SessionRecord;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    deck_id: String,
    chapter_id: Option<String>,
    started_at: String,
    finished_at: String,
    learned: usize,
    learning: usize,
    total_swipes: usize,
}

impl From<&SessionRecord> for CsvRow {
    fn from(record: &SessionRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            deck_id: record.deck_id.clone(),
            chapter_id: record.chapter_id.clone(),
            started_at: record.started_at.to_rfc3339(),
            finished_at: record.finished_at.to_rfc3339(),
            learned: record.learned_count,
            learning: record.learning_count,
            total_swipes: record.total_swipes,
        }
    }
}

/// Roll the session log into CSV and archive the log atomically.
///
/// Returns the number of records exported. The log is renamed to
/// `.processed` (not deleted) so it can be recovered manually if needed.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::session_log::read_records(log_path)?;

    if records.is_empty() {
        tracing::info!("No session records to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Only the first export writes the header row
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} session records to CSV", records.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;
    tracing::info!("Archived session log to {:?}", processed_path);

    Ok(records.len())
}

/// Remove archived `.processed` session logs in a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed session logs", count);
    }

    Ok(count)
}
