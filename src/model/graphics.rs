//! Registry of graphics files referenced by `g` directives.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One registered graphics file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicEntry {
    /// File name as resolved on disk (e.g. `diagram.png`)
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Mapping from resolved graphics file name to its size in bytes.
///
/// Filled while scanning; read once at the end for the size report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphicsRegistry {
    sizes: HashMap<String, u64>,
}

impl GraphicsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a file. Registering the same name twice keeps the latest size.
    pub fn record(&mut self, name: impl Into<String>, size: u64) {
        self.sizes.insert(name.into(), size);
    }

    /// Size recorded for `name`.
    pub fn size_of(&self, name: &str) -> Option<u64> {
        self.sizes.get(name).copied()
    }

    /// Number of distinct files.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all registered sizes.
    pub fn total_bytes(&self) -> u64 {
        self.sizes.values().sum()
    }

    /// Entries sorted by ascending size, ties broken by name.
    pub fn sorted(&self) -> Vec<GraphicEntry> {
        let mut entries: Vec<GraphicEntry> = self
            .sizes
            .iter()
            .map(|(name, size)| GraphicEntry {
                name: name.clone(),
                size: *size,
            })
            .collect();
        entries.sort_by(|a, b| a.size.cmp(&b.size).then_with(|| a.name.cmp(&b.name)));
        entries
    }
}
