//! Resolution of packaged, read-only model assets.
//!
//! An [`AssetStore`] turns a logical asset name (for example `distilgpt2_model.tflite`) into a
//! [`ModelAsset`]: a read-only view of the model bytes plus their offset and declared length.
//! Two stores are provided:
//! * [`DirectoryAssetStore`] – maps files below a root directory read-only, optionally a
//!   declared sub-range of a larger packaged file.
//! * [`InMemoryAssetStore`] – serves bytes held in memory, for tests and embedded hosts.
mod asset;
mod directory;
mod error;
mod memory;

pub use asset::ModelAsset;
pub use directory::DirectoryAssetStore;
pub use error::AssetError;
pub use memory::InMemoryAssetStore;

/// Source of packaged model assets.
pub trait AssetStore: Send + Sync {
    /// Resolve a logical asset name.
    ///
    /// Returns [`AssetError::NotFound`] when no asset with that name exists, so callers can tell
    /// a missing artifact apart from one that exists but cannot be read.
    fn resolve(&self, name: &str) -> Result<ModelAsset, AssetError>;

    /// Whether an asset with that name exists.
    fn contains(&self, name: &str) -> bool {
        !matches!(self.resolve(name), Err(AssetError::NotFound(_)))
    }
}

impl<T: AssetStore + ?Sized> AssetStore for &T {
    fn resolve(&self, name: &str) -> Result<ModelAsset, AssetError> {
        (**self).resolve(name)
    }
}

impl<T: AssetStore + ?Sized> AssetStore for std::sync::Arc<T> {
    fn resolve(&self, name: &str) -> Result<ModelAsset, AssetError> {
        (**self).resolve(name)
    }
}

/// Normalize an asset name: forward slashes only, no leading `./` or `/`, no empty segments.
///
/// Returns `None` for names that are empty or try to leave the store root through `..`.
pub fn normalize_asset_name(name: &str) -> Option<String> {
    let replaced = name.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in replaced.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("distilgpt2_model.tflite", Some("distilgpt2_model.tflite"))]
    #[case("./models/gpt2.tflite", Some("models/gpt2.tflite"))]
    #[case("/models//gpt2.tflite", Some("models/gpt2.tflite"))]
    #[case("models\\gpt2.tflite", Some("models/gpt2.tflite"))]
    #[case("../secret.bin", None)]
    #[case("models/../../secret.bin", None)]
    #[case("", None)]
    #[case("./", None)]
    fn normalizes_asset_names(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_asset_name(input).as_deref(), expected);
    }

    #[test]
    fn contains_follows_resolve() {
        let store = InMemoryAssetStore::new().with_bytes("model.tflite", vec![1u8, 2, 3]);
        assert!(store.contains("model.tflite"));
        assert!(!store.contains("other.tflite"));
    }
}
