mod base;
mod builder;
mod job;


pub use base::{AdapterStatus, AssetInfo, InferenceAdapter};
pub use builder::AdapterBuilder;
pub use job::GenerationJob;
