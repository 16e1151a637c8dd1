use thiserror::Error;
use undercover_assets::AssetError;

/// Text returned by [`InferenceAdapter::generate_word`](crate::InferenceAdapter::generate_word)
/// when no model is loaded.
pub const UNLOADED_SENTINEL: &str = "Error: AI model not found";

/// Text returned by [`InferenceAdapter::generate_word`](crate::InferenceAdapter::generate_word)
/// when a model is loaded but the call failed.
pub const GENERATION_FAILED_SENTINEL: &str = "Error generating word";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model asset not found: {0}")]
    AssetNotFound(String),
    #[error("Model asset could not be loaded: {0}")]
    AssetLoad(#[source] AssetError),
    #[error("Inference runtime rejected model '{asset}': {source}")]
    RuntimeInit {
        asset: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Tensor shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Inference execution failed: {0}")]
    Execution(#[source] anyhow::Error),
    #[error("Output decoding failed: {0}")]
    Decoding(String),
    #[error("Model is not loaded")]
    Unloaded,
    #[error("Generation thread panicked: {0}")]
    ThreadPanicked(String),
}

/// Fieldless mirror of [`InferenceError`], convenient for matching and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    AssetNotFound,
    AssetLoad,
    RuntimeInit,
    ShapeMismatch,
    Execution,
    Decoding,
    Unloaded,
    ThreadPanicked,
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::AssetNotFound(_) => ErrorKind::AssetNotFound,
            InferenceError::AssetLoad(_) => ErrorKind::AssetLoad,
            InferenceError::RuntimeInit { .. } => ErrorKind::RuntimeInit,
            InferenceError::ShapeMismatch(_) => ErrorKind::ShapeMismatch,
            InferenceError::Execution(_) => ErrorKind::Execution,
            InferenceError::Decoding(_) => ErrorKind::Decoding,
            InferenceError::Unloaded => ErrorKind::Unloaded,
            InferenceError::ThreadPanicked(_) => ErrorKind::ThreadPanicked,
        }
    }

    pub fn is_unloaded(&self) -> bool {
        matches!(self, InferenceError::Unloaded)
    }

    /// Sentinel text the game shows in place of a generated word.
    pub fn sentinel(&self) -> &'static str {
        if self.is_unloaded() {
            UNLOADED_SENTINEL
        } else {
            GENERATION_FAILED_SENTINEL
        }
    }
}

impl From<AssetError> for InferenceError {
    fn from(error: AssetError) -> Self {
        match error {
            AssetError::NotFound(name) => InferenceError::AssetNotFound(name),
            other => InferenceError::AssetLoad(other),
        }
    }
}

/// Render a panic payload caught with `catch_unwind` or `JoinHandle::join`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
