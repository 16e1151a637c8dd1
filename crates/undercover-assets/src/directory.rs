use std::collections::HashMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use memmap2::MmapOptions;

use crate::{AssetError, AssetStore, ModelAsset, normalize_asset_name};

/// Byte range of an asset stored inside a larger packaged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DeclaredRange {
    offset: u64,
    length: u64,
}

/// Asset store rooted at a directory on disk.
///
/// Assets are memory-mapped read-only instead of being copied to the heap. A name can be given a
/// declared range with [`DirectoryAssetStore::with_range`], in which case only that window of the
/// file is mapped, the way packaged application assets are exposed through a file descriptor plus
/// start offset and declared length.
#[derive(Debug, Clone)]
pub struct DirectoryAssetStore {
    root: PathBuf,
    ranges: HashMap<String, DeclaredRange>,
}

impl DirectoryAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ranges: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Declare that `name` only covers `length` bytes starting at `offset` of its file.
    pub fn with_range(mut self, name: impl AsRef<str>, offset: u64, length: u64) -> Self {
        if let Some(name) = normalize_asset_name(name.as_ref()) {
            self.ranges.insert(name, DeclaredRange { offset, length });
        }
        self
    }

    fn path_of(&self, normalized: &str) -> PathBuf {
        normalized
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl AssetStore for DirectoryAssetStore {
    fn resolve(&self, name: &str) -> Result<ModelAsset, AssetError> {
        let normalized =
            normalize_asset_name(name).ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let path = self.path_of(&normalized);

        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AssetError::NotFound(normalized.clone()),
            _ => AssetError::Io {
                name: normalized.clone(),
                source: e,
            },
        })?;
        let metadata = file.metadata().map_err(|e| AssetError::Io {
            name: normalized.clone(),
            source: e,
        })?;
        if !metadata.is_file() {
            return Err(AssetError::NotFound(normalized));
        }
        let size = metadata.len();

        let range = self
            .ranges
            .get(&normalized)
            .copied()
            .unwrap_or(DeclaredRange {
                offset: 0,
                length: size,
            });
        let in_bounds = range
            .offset
            .checked_add(range.length)
            .is_some_and(|end| end <= size);
        let length = usize::try_from(range.length).ok().filter(|_| in_bounds);
        let Some(length) = length else {
            return Err(AssetError::InvalidRange {
                name: normalized,
                offset: range.offset,
                length: range.length,
                size,
            });
        };

        if length == 0 {
            return Ok(ModelAsset::from_shared(normalized, Vec::<u8>::new()));
        }

        // SAFETY: the map is read-only; packaged assets are not modified while the game runs.
        let map = unsafe {
            MmapOptions::new()
                .offset(range.offset)
                .len(length)
                .map(&file)
        }
        .map_err(|e| AssetError::Io {
            name: normalized.clone(),
            source: e,
        })?;

        log::debug!(
            target: "undercover::assets",
            "Mapped asset '{}' ({} bytes at offset {})",
            normalized,
            length,
            range.offset
        );
        Ok(ModelAsset::mapped(normalized, range.offset, map))
    }
}
