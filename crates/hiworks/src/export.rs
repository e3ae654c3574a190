//! CSV export of extracted schedule rows.

use crate::types::ScheduleRow;
use std::error::Error;
use std::path::Path;
use tracing::info;

const HEADERS: [&str; 7] = [
    "date",
    "time",
    "title",
    "description",
    "location",
    "attendees",
    "status",
];

/// Writes rows to a CSV file, creating parent directories as needed.
pub fn write_csv(path: &Path, rows: &[ScheduleRow]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record([
            &row.date,
            &row.time,
            &row.title,
            &row.description,
            &row.location,
            &row.attendees,
            &row.status,
        ])?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "schedule exported to CSV");
    Ok(())
}
