//! On-device word generation for the Undercover game.
//!
//! [`InferenceAdapter`] binds a packaged model asset (resolved through an
//! [`AssetStore`](undercover_assets::AssetStore)) to an opaque [`InferenceRuntime`] and turns a
//! prompt into text. Construction never fails: a missing or rejected model leaves the adapter
//! unloaded and every call reports [`InferenceError::Unloaded`].
//!
//! ```no_run
//! # use undercover_inference::{InferenceAdapter, InferenceRuntime};
//! # use undercover_assets::DirectoryAssetStore;
//! # fn demo(runtime: impl InferenceRuntime) {
//! let adapter = InferenceAdapter::new(&DirectoryAssetStore::new("assets"), runtime);
//! match adapter.generate("civilian word") {
//!     Ok(text) => println!("{text}"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```
mod adapter;
mod buffer;
mod config;
mod error;
mod host;
pub mod logging;
mod policy;
mod runtime;
mod shape;
mod vocab;

pub use adapter::{AdapterBuilder, AdapterStatus, AssetInfo, GenerationJob, InferenceAdapter};
pub use buffer::{ELEMENT_WIDTH, InputEncoding, OutputBuffer, OutputValues, encode_f32};
pub use config::{
    AdapterConfig, ConfigError, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_MODEL_ASSET, DEFAULT_TOKEN,
    DecodingPolicy, PromptEncoding,
};
pub use error::{ErrorKind, GENERATION_FAILED_SENTINEL, InferenceError, UNLOADED_SENTINEL};
pub use policy::join_floats;
pub use runtime::{InferenceRuntime, RuntimeSession};
pub use shape::{ShapeError, TensorShape};
pub use vocab::{SPACE_MARKER, Vocabulary};

pub use undercover_assets::{AssetError, AssetStore, ModelAsset};
