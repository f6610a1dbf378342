//! Junk labeling.
//!
//! The label feeds the `is_junk` column of the dataset. Anything smarter than
//! the extension/keyword heuristic (a trained model, say) plugs in through
//! [`JunkClassifier`].

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use dustfile_core::FileRecord;

/// Labels a record as junk or not.
pub trait JunkClassifier: Send + Sync {
    fn is_junk(&self, record: &FileRecord) -> bool;
}

/// Junk iff the extension is listed, or the path contains a listed keyword.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct HeuristicJunk {
    /// Extensions (with leading dot) that always mean junk.
    #[builder(default = "default_extensions()")]
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Case-insensitive substrings of the full path that mean junk.
    #[builder(default = "default_keywords()")]
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".tmp", ".log", ".lnk", ".bak", ".dmp", ".old", ".cache"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_keywords() -> Vec<String> {
    ["cache", "temp", "install", "log", "debug", "crash", "setup"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for HeuristicJunk {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            keywords: default_keywords(),
        }
    }
}

impl HeuristicJunk {
    /// Create a new builder.
    pub fn builder() -> HeuristicJunkBuilder {
        HeuristicJunkBuilder::default()
    }

    /// Replace the junk extensions (with leading dot, any case).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the junk path keywords.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl JunkClassifier for HeuristicJunk {
    fn is_junk(&self, record: &FileRecord) -> bool {
        if let Some(ext) = record.extension.as_deref() {
            if self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
                return true;
            }
        }

        let path = record.path.to_string_lossy().to_lowercase();
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && path.contains(&k.to_lowercase()))
    }
}
