use std::path::Path;

use crate::error::{Error, Result};

/// Label reported when the predicted index has no entry in the map.
pub const UNKNOWN_LABEL: &str = "Tidak Diketahui";

const DEFAULT_LABELS: [&str; 3] = ["Kucing", "Anjing", "Ular"];

/// Class index to display name lookup. Fixed once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}

impl LabelMap {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Read a class list with one label per line; the line order gives the
    /// class index. Blank lines are skipped; a list with no labels is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::LabelLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let labels = Self::parse(&contents);
        if labels.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "class list {} contains no labels",
                path.display()
            )));
        }
        Ok(labels)
    }

    fn parse(contents: &str) -> Self {
        let labels = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Self::new(labels)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn label_or_unknown(&self, index: usize) -> &str {
        self.get(index).unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
