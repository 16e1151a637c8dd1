use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Failed to open asset '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "Asset '{name}' declares bytes {offset}..{offset}+{length} but the backing file holds {size} bytes"
    )]
    InvalidRange {
        name: String,
        offset: u64,
        length: u64,
        size: u64,
    },
}

impl AssetError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound(_))
    }
}
