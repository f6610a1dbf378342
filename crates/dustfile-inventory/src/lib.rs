//! Inventory collection for dustfile.
//!
//! Ties the walker and the analyzers together: every configured root is
//! walked, records from all roots are checked for duplicates as one set,
//! each record gets a junk label, and the result can be written out as a
//! CSV or JSON dataset.
//!
//! ```rust,no_run
//! use dustfile_inventory::{DatasetFormat, InventoryCollector, InventoryConfig};
//! use std::path::Path;
//!
//! let config = InventoryConfig::new(["/home/user/Downloads"]);
//! let inventory = InventoryCollector::new(config)?.collect();
//! inventory.save(Path::new("inventory.csv"), DatasetFormat::Csv)?;
//! println!("{}", inventory.summary);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod collector;
mod dataset;
mod error;
mod summary;

use std::io::Write;
use std::path::Path;

pub use collector::{Inventory, InventoryCollector, InventoryEntry, RootFailure, RootReport};
pub use dataset::{
    COLUMNS, DatasetFormat, DatasetRow, FEATURE_COLUMNS, LABEL_COLUMN, default_dataset_name,
    save_dataset, write_csv, write_dataset, write_json,
};
pub use error::ExportError;
pub use summary::InventorySummary;

// Re-exports for callers that only depend on this crate
pub use dustfile_analyze::{DuplicateGroup, DuplicateReport, HeuristicJunk, JunkClassifier};
pub use dustfile_core::{ErrorAction, ErrorPolicy, FileRecord, InventoryConfig, ScanError};
pub use dustfile_scan::{CancellationToken, RecordBuilder, ScanProgress};

impl Inventory {
    /// Dataset rows in scan order.
    pub fn rows(&self) -> Vec<DatasetRow> {
        self.entries.iter().map(DatasetRow::from_entry).collect()
    }

    /// Write the dataset to any writer.
    pub fn write_to<W: Write>(&self, format: DatasetFormat, writer: W) -> Result<(), ExportError> {
        write_dataset(&self.entries, format, writer)
    }

    /// Write the dataset to a file.
    pub fn save(&self, path: &Path, format: DatasetFormat) -> Result<(), ExportError> {
        save_dataset(&self.entries, format, path)
    }
}
