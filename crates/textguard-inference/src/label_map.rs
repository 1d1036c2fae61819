//! Class index to label mapping

use std::collections::HashMap;
use std::path::Path;

use textguard_core::{Error, Result};

/// Static mapping from model output class index to a human-readable label.
///
/// Loaded once from a side-car JSON resource (a flat object whose keys are
/// class indices as strings) and immutable thereafter. The map is allowed to
/// be sparse: an index the model produces but the map does not cover is a
/// runtime data error surfaced by [`LabelMap::get`], not a load failure.
#[derive(Debug, Clone)]
pub struct LabelMap {
    labels: HashMap<usize, String>,
}

impl LabelMap {
    /// Load a label map from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::resource(format!("failed to read label map {}: {}", path.display(), e))
        })?;

        let raw: HashMap<String, String> = serde_json::from_str(&contents).map_err(|e| {
            Error::resource(format!(
                "label map {} is not a flat JSON object: {}",
                path.display(),
                e
            ))
        })?;

        let mut labels = HashMap::with_capacity(raw.len());
        for (key, label) in raw {
            let index: usize = key.parse().map_err(|_| {
                Error::resource(format!("label map key is not a class index: {:?}", key))
            })?;
            labels.insert(index, label);
        }

        tracing::debug!(entries = labels.len(), path = %path.display(), "label map loaded");
        Ok(Self { labels })
    }

    /// Build a label map from in-memory entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, String)>) -> Self {
        Self {
            labels: entries.into_iter().collect(),
        }
    }

    /// Resolve a class index to its label.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.labels
            .get(&index)
            .map(String::as_str)
            .ok_or(Error::LabelLookup(index))
    }

    /// Whether the map covers the given class index.
    pub fn contains(&self, index: usize) -> bool {
        self.labels.contains_key(&index)
    }

    /// Number of mapped classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
