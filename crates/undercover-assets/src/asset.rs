use memmap2::Mmap;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

#[derive(Clone)]
enum AssetBytes {
    Mapped(Arc<Mmap>),
    Shared(Arc<[u8]>),
}

/// A read-only view over a packaged model file.
///
/// The bytes are either a read-only memory map of the backing file or shared immutable heap
/// bytes. Cloning a [`ModelAsset`] never copies the model; the mapping is released once the
/// last clone is dropped.
#[derive(Clone)]
pub struct ModelAsset {
    name: String,
    offset: u64,
    bytes: AssetBytes,
}

impl ModelAsset {
    pub(crate) fn mapped(name: impl Into<String>, offset: u64, map: Mmap) -> Self {
        Self {
            name: name.into(),
            offset,
            bytes: AssetBytes::Mapped(Arc::new(map)),
        }
    }

    /// Wrap bytes that already live in memory.
    pub fn from_shared(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            offset: 0,
            bytes: AssetBytes::Shared(bytes.into()),
        }
    }

    /// Logical name the asset was resolved from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte offset of the asset inside its backing file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Declared length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the bytes come from a memory map rather than the heap.
    pub fn is_mapped(&self) -> bool {
        matches!(self.bytes, AssetBytes::Mapped(_))
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.bytes {
            AssetBytes::Mapped(map) => &map[..],
            AssetBytes::Shared(bytes) => &bytes[..],
        }
    }
}

impl Deref for ModelAsset {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for ModelAsset {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Debug for ModelAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAsset")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("len", &self.len())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_asset_exposes_its_bytes() {
        let asset = ModelAsset::from_shared("model.tflite", vec![1u8, 2, 3]);
        assert_eq!(asset.name(), "model.tflite");
        assert_eq!(asset.offset(), 0);
        assert_eq!(asset.len(), 3);
        assert_eq!(&asset[..], &[1, 2, 3]);
        assert!(!asset.is_mapped());
    }

    #[test]
    fn clones_share_the_same_bytes() {
        let asset = ModelAsset::from_shared("model.tflite", vec![7u8; 16]);
        let clone = asset.clone();
        assert_eq!(asset.as_bytes().as_ptr(), clone.as_bytes().as_ptr());
    }

    #[test]
    fn debug_output_omits_the_payload() {
        let asset = ModelAsset::from_shared("model.tflite", vec![0u8; 4]);
        let debug = format!("{asset:?}");
        assert!(debug.contains("model.tflite"));
        assert!(debug.contains("len: 4"));
    }
}
