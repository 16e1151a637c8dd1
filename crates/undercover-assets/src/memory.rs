use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{AssetError, AssetStore, ModelAsset, normalize_asset_name};

/// In-memory asset store for tests and hosts that embed their models.
#[derive(Default, Clone)]
pub struct InMemoryAssetStore {
    files: BTreeMap<String, Arc<[u8]>>, // normalized name -> bytes
}

impl InMemoryAssetStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add raw bytes under `name`.
    ///
    /// Names that cannot be normalized (empty, or escaping the root) are ignored.
    pub fn with_bytes(mut self, name: impl AsRef<str>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add raw bytes under `name`, replacing any previous asset with that name.
    pub fn insert(&mut self, name: impl AsRef<str>, bytes: impl Into<Arc<[u8]>>) {
        match normalize_asset_name(name.as_ref()) {
            Some(name) => {
                self.files.insert(name, bytes.into());
            }
            None => log::warn!(
                target: "undercover::assets",
                "Ignoring asset with invalid name: {:?}",
                name.as_ref()
            ),
        }
    }

    /// Get all asset names in the store
    pub fn names(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

impl AssetStore for InMemoryAssetStore {
    fn resolve(&self, name: &str) -> Result<ModelAsset, AssetError> {
        let normalized =
            normalize_asset_name(name).ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let bytes = self
            .files
            .get(&normalized)
            .ok_or_else(|| AssetError::NotFound(normalized.clone()))?;
        Ok(ModelAsset::from_shared(normalized, bytes.clone()))
    }
}
