use undercover_assets::AssetStore;

use super::base::InferenceAdapter;
use crate::config::AdapterConfig;
use crate::runtime::InferenceRuntime;

/// Builder for [`InferenceAdapter`].
///
/// ```no_run
/// # use undercover_inference::{AdapterConfig, InferenceAdapter, InferenceRuntime};
/// # use undercover_assets::DirectoryAssetStore;
/// # fn demo(runtime: impl InferenceRuntime) {
/// let store = DirectoryAssetStore::new("assets");
/// let adapter = InferenceAdapter::builder(runtime)
///     .with_config(AdapterConfig::default().with_max_output_bytes(16 * 1024 * 1024))
///     .build(&store);
/// println!("{}", adapter.generate_word("spy"));
/// # }
/// ```
pub struct AdapterBuilder<R> {
    runtime: R,
    config: AdapterConfig,
}

impl<R: InferenceRuntime> AdapterBuilder<R> {
    pub fn new(runtime: R) -> Self {
        Self {
            runtime,
            config: AdapterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_model_asset(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_model_asset(name);
        self
    }

    pub fn with_max_output_bytes(mut self, max: u64) -> Self {
        self.config = self.config.with_max_output_bytes(max);
        self
    }

    /// Resolve the model asset and initialize the runtime.
    ///
    /// Never fails: any problem leaves the adapter unloaded, with the cause available through
    /// [`InferenceAdapter::load_failure`].
    pub fn build<A: AssetStore + ?Sized>(self, store: &A) -> InferenceAdapter {
        InferenceAdapter::load(store, &self.runtime, self.config)
    }
}

impl InferenceAdapter {
    /// Load the default model asset from `store` with default settings.
    pub fn new<A: AssetStore + ?Sized>(store: &A, runtime: impl InferenceRuntime) -> Self {
        Self::builder(runtime).build(store)
    }

    pub fn builder<R: InferenceRuntime>(runtime: R) -> AdapterBuilder<R> {
        AdapterBuilder::new(runtime)
    }
}
