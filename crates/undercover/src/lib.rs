#![warn(missing_docs)]

//! # Undercover
//!
//! Word generation for the Undercover party game, backed by a packaged on-device model.

/// Packaged model assets.
#[cfg(feature = "assets")]
pub mod assets {
    pub use undercover_assets::*;
}

/// Inference adapter.
#[cfg(feature = "inference")]
pub use undercover_inference::*;
