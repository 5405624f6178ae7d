//! Botanical knowledge store
//!
//! Read-only morphology/ecology descriptions keyed by the string form of the
//! class id, loaded once from a JSON file:
//!
//! ```json
//! { "5": { "morphology": "...", "ecology": "..." } }
//! ```
//!
//! Lookups are lenient: a class without an authored entry simply has no
//! descriptions.

use flora_common::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Descriptive fields for one class
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KnowledgeEntry {
    #[serde(default)]
    pub morphology: Option<String>,
    #[serde(default)]
    pub ecology: Option<String>,
}

/// Immutable class id → knowledge entry map
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    entries: HashMap<String, KnowledgeEntry>,
}

impl KnowledgeStore {
    /// Load the knowledge base from disk
    ///
    /// A missing or malformed file is a startup error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "knowledge base {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        info!(
            "Loaded {} knowledge entries from {}",
            store.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parse the knowledge base from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, KnowledgeEntry> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (usize, KnowledgeEntry)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(class_id, entry)| (class_id.to_string(), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a class id; absent ids yield an empty entry
    pub fn lookup(&self, class_id: usize) -> KnowledgeEntry {
        self.entries
            .get(&class_id.to_string())
            .cloned()
            .unwrap_or_default()
    }
}
