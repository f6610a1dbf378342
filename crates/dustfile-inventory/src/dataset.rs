//! Tabular dataset export.
//!
//! One row per record. Column names and order are fixed so that downstream
//! tooling (classifier training, mostly) can read any run's output without
//! adapting.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use dustfile_core::format_timestamp;

use crate::collector::InventoryEntry;
use crate::error::ExportError;

/// Dataset columns, in output order.
pub const COLUMNS: [&str; 12] = [
    "path",
    "size",
    "last_modified",
    "last_accessed",
    "extension",
    "depth",
    "digest",
    "is_junk",
    "last_modified_str",
    "last_accessed_str",
    "is_duplicate",
    "is_redundant_copy",
];

/// Column a classifier is trained to predict.
pub const LABEL_COLUMN: &str = "is_junk";

/// Columns a classifier may learn from: everything except path-like,
/// identifier and derived display columns, and the label.
pub const FEATURE_COLUMNS: [&str; 7] = [
    "size",
    "last_modified",
    "last_accessed",
    "extension",
    "depth",
    "is_duplicate",
    "is_redundant_copy",
];

/// Output format of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    #[default]
    Csv,
    Json,
}

impl DatasetFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// One dataset row. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub path: String,
    pub size: u64,
    pub last_modified: f64,
    pub last_accessed: f64,
    pub extension: String,
    pub depth: u32,
    /// Empty cell (CSV) or `null` (JSON) when no digest was computed.
    pub digest: Option<String>,
    pub is_junk: bool,
    pub last_modified_str: String,
    pub last_accessed_str: String,
    pub is_duplicate: bool,
    pub is_redundant_copy: bool,
}

impl DatasetRow {
    pub fn from_entry(entry: &InventoryEntry) -> Self {
        let record = &entry.record;
        Self {
            path: record.path.to_string_lossy().into_owned(),
            size: record.size,
            last_modified: record.timestamps.modified_secs(),
            last_accessed: record.timestamps.accessed_secs(),
            extension: record.extension_label().to_string(),
            depth: record.depth,
            digest: record.digest_hex(),
            is_junk: entry.is_junk,
            last_modified_str: format_timestamp(record.timestamps.modified),
            last_accessed_str: format_timestamp(record.timestamps.accessed),
            is_duplicate: record.is_duplicate,
            is_redundant_copy: record.is_redundant_copy,
        }
    }
}

/// Write entries as CSV with a header row.
pub fn write_csv<W: Write>(entries: &[InventoryEntry], writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        // serde only emits the header together with the first row.
        wtr.write_record(COLUMNS)?;
    }
    for entry in entries {
        wtr.serialize(DatasetRow::from_entry(entry))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write entries as a pretty-printed JSON array of row objects.
pub fn write_json<W: Write>(entries: &[InventoryEntry], writer: W) -> Result<(), ExportError> {
    let rows: Vec<DatasetRow> = entries.iter().map(DatasetRow::from_entry).collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Write entries in the given format.
pub fn write_dataset<W: Write>(
    entries: &[InventoryEntry],
    format: DatasetFormat,
    writer: W,
) -> Result<(), ExportError> {
    match format {
        DatasetFormat::Csv => write_csv(entries, writer),
        DatasetFormat::Json => write_json(entries, writer),
    }
}

/// Write entries to a file, creating or truncating it.
pub fn save_dataset(
    entries: &[InventoryEntry],
    format: DatasetFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    write_dataset(entries, format, &mut writer)?;
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Timestamped output file name, e.g. `file_dataset_20250520_202205.csv`.
pub fn default_dataset_name(format: DatasetFormat) -> String {
    format!(
        "file_dataset_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dustfile_core::{ContentHash, FileRecord, Timestamps};
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(path: &str, digest: Option<u8>, is_junk: bool) -> InventoryEntry {
        let t = UNIX_EPOCH + Duration::from_secs(1_747_772_525);
        InventoryEntry {
            record: FileRecord::new(
                PathBuf::from(path),
                12_345,
                Timestamps::new(t, t),
                digest.map(|b| ContentHash::new([b; 32])),
            ),
            is_junk,
        }
    }

    #[test]
    fn test_feature_columns_are_dataset_columns() {
        for col in FEATURE_COLUMNS {
            assert!(COLUMNS.contains(&col));
        }
        assert!(COLUMNS.contains(&LABEL_COLUMN));
        assert!(!FEATURE_COLUMNS.contains(&LABEL_COLUMN));
        assert!(!FEATURE_COLUMNS.contains(&"path"));
        assert!(!FEATURE_COLUMNS.contains(&"digest"));
    }

    #[test]
    fn test_csv_header_and_row() {
        let mut out = Vec::new();
        write_csv(&[entry("/data/Report.PDF", None, false)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next().unwrap(), COLUMNS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "/data/Report.PDF,12345,1747772525.0,1747772525.0,.pdf,2,,false,\
             2025-05-20 20:22:05,2025-05-20 20:22:05,false,false"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_header_without_rows() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), COLUMNS.join(","));
    }

    #[test]
    fn test_json_rows() {
        let mut out = Vec::new();
        write_json(&[entry("/x/notes", Some(0xab), true)], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let row = &value[0];

        assert_eq!(row["extension"], "<none>");
        assert_eq!(row["digest"], "ab".repeat(32));
        assert_eq!(row["is_junk"], true);
        assert_eq!(row["is_duplicate"], false);

        let keys: Vec<_> = row.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), COLUMNS.len());
    }

    #[test]
    fn test_default_name() {
        let name = default_dataset_name(DatasetFormat::Csv);
        assert!(name.starts_with("file_dataset_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "file_dataset_YYYYMMDD_HHMMSS.csv".len());
    }
}
