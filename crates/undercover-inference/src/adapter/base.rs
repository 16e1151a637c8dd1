use std::fmt::{Debug, Formatter};
use std::panic::{AssertUnwindSafe, catch_unwind};

use undercover_assets::{AssetStore, ModelAsset};

use crate::buffer::{InputEncoding, OutputBuffer};
use crate::config::AdapterConfig;
use crate::error::{InferenceError, panic_message};
use crate::host::SessionHost;
use crate::logging::LOG_TARGET;
use crate::runtime::{InferenceRuntime, RuntimeSession};
use crate::shape::TensorShape;
use crate::vocab::Vocabulary;

/// Whether an adapter has a usable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AdapterStatus {
    Ready,
    Unloaded,
}

/// Metadata of the model asset bound to a ready adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub name: String,
    pub offset: u64,
    pub len: usize,
    pub mapped: bool,
}

impl From<&ModelAsset> for AssetInfo {
    fn from(asset: &ModelAsset) -> Self {
        Self {
            name: asset.name().to_string(),
            offset: asset.offset(),
            len: asset.len(),
            mapped: asset.is_mapped(),
        }
    }
}

/// On-device text generation over an opaque inference runtime.
///
/// An adapter is either ready (one live runtime session, declared shapes known) or unloaded
/// (no session; every call short-circuits). The state is decided once at construction and never
/// changes: call failures are reported per call, and replacing the model means building a new
/// adapter.
///
/// The adapter is `Send + Sync`. Input encoding, output allocation and decoding happen on the
/// calling thread; the runtime session itself is driven by a single host thread, so runs from
/// concurrent callers are executed one after the other.
pub struct InferenceAdapter {
    config: AdapterConfig,
    state: AdapterState,
}

enum AdapterState {
    Ready(ReadySession),
    Unloaded(InferenceError),
}

struct ReadySession {
    asset: AssetInfo,
    input_shape: TensorShape,
    output_shape: TensorShape,
    vocabulary: Option<Vocabulary>,
    host: SessionHost<Box<dyn RuntimeSession>>,
}

impl ReadySession {
    fn run(
        &self,
        input: InputEncoding,
        mut output: OutputBuffer,
    ) -> Result<OutputBuffer, InferenceError> {
        let (result, output) = self
            .host
            .with(move |session| {
                let result = session.run(input.as_bytes(), output.as_mut_bytes());
                (result, output)
            })
            .map_err(|e| InferenceError::Execution(e.into()))?;
        result.map_err(InferenceError::Execution)?;
        Ok(output)
    }
}

impl Drop for ReadySession {
    fn drop(&mut self) {
        log::debug!(target: LOG_TARGET, "Releasing model '{}'", self.asset.name);
    }
}

impl InferenceAdapter {
    pub(crate) fn load<A, R>(store: &A, runtime: &R, config: AdapterConfig) -> Self
    where
        A: AssetStore + ?Sized,
        R: InferenceRuntime + ?Sized,
    {
        let state = match Self::try_load(store, runtime, &config) {
            Ok(ready) => {
                log::info!(
                    target: LOG_TARGET,
                    "Model '{}' loaded successfully ({} bytes, {})",
                    ready.asset.name,
                    ready.asset.len,
                    if ready.asset.mapped { "memory-mapped" } else { "in memory" }
                );
                AdapterState::Ready(ready)
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Error loading model: {e}");
                AdapterState::Unloaded(e)
            }
        };
        Self { config, state }
    }

    fn try_load<A, R>(
        store: &A,
        runtime: &R,
        config: &AdapterConfig,
    ) -> Result<ReadySession, InferenceError>
    where
        A: AssetStore + ?Sized,
        R: InferenceRuntime + ?Sized,
    {
        let init_error = |source: anyhow::Error| InferenceError::RuntimeInit {
            asset: config.model_asset.clone(),
            source,
        };

        config.validate().map_err(|e| init_error(e.into()))?;

        let asset = store.resolve(&config.model_asset)?;
        let info = AssetInfo::from(&asset);

        let session = catch_unwind(AssertUnwindSafe(|| runtime.initialize(asset)))
            .unwrap_or_else(|payload| {
                Err(anyhow::anyhow!(
                    "runtime panicked during initialization: {}",
                    panic_message(payload.as_ref())
                ))
            })
            .map_err(init_error)?;

        let host = SessionHost::spawn(&info.name, session).map_err(|e| init_error(e.into()))?;
        let (input_shape, output_shape) = host
            .with(|session| -> anyhow::Result<(TensorShape, TensorShape)> {
                Ok((session.input_shape(0)?, session.output_shape(0)?))
            })
            .map_err(|e| init_error(e.into()))?
            .map_err(init_error)?;
        log::debug!(target: LOG_TARGET, "Expected input tensor shape: {input_shape}");
        log::debug!(target: LOG_TARGET, "Expected output tensor shape: {output_shape}");

        let vocabulary = config
            .vocabulary_asset
            .as_deref()
            .and_then(|name| load_vocabulary(store, name));
        if config.needs_vocabulary() && vocabulary.is_none() {
            log::warn!(
                target: LOG_TARGET,
                "No usable vocabulary; prompts map to the fallback token and output is printed raw"
            );
        }

        Ok(ReadySession {
            asset: info,
            input_shape,
            output_shape,
            vocabulary,
            host,
        })
    }

    pub fn status(&self) -> AdapterStatus {
        match self.state {
            AdapterState::Ready(_) => AdapterStatus::Ready,
            AdapterState::Unloaded(_) => AdapterStatus::Unloaded,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status() == AdapterStatus::Ready
    }

    /// Why construction ended unloaded, if it did.
    pub fn load_failure(&self) -> Option<&InferenceError> {
        match &self.state {
            AdapterState::Ready(_) => None,
            AdapterState::Unloaded(e) => Some(e),
        }
    }

    /// Declared shape of input tensor 0.
    pub fn input_shape(&self) -> Option<&TensorShape> {
        self.ready().map(|r| &r.input_shape)
    }

    /// Declared shape of output tensor 0.
    pub fn output_shape(&self) -> Option<&TensorShape> {
        self.ready().map(|r| &r.output_shape)
    }

    pub fn model_asset(&self) -> Option<&AssetInfo> {
        self.ready().map(|r| &r.asset)
    }

    pub fn has_vocabulary(&self) -> bool {
        self.ready().is_some_and(|r| r.vocabulary.is_some())
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn ready(&self) -> Option<&ReadySession> {
        match &self.state {
            AdapterState::Ready(ready) => Some(ready),
            AdapterState::Unloaded(_) => None,
        }
    }

    /// Run the model once and turn its output into text.
    ///
    /// Returns [`InferenceError::Unloaded`] without touching any runtime when the adapter has no
    /// model. Every other error means the model is loaded but this particular call failed; the
    /// adapter stays usable.
    pub fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let Some(ready) = self.ready() else {
            log::error!(target: LOG_TARGET, "Model is not loaded.");
            return Err(InferenceError::Unloaded);
        };
        let result = self.generate_with(ready, prompt);
        match &result {
            Ok(_) => log::debug!(target: LOG_TARGET, "Model inference successful"),
            Err(e) => log::error!(target: LOG_TARGET, "Error running model ({}): {e}", e.kind()),
        }
        result
    }

    fn generate_with(&self, ready: &ReadySession, prompt: &str) -> Result<String, InferenceError> {
        let vocabulary = ready.vocabulary.as_ref();

        let input = self.config.prompt_encoding.encode(prompt, vocabulary);
        input.check_against(&ready.input_shape)?;

        let output = OutputBuffer::allocate(&ready.output_shape, self.config.max_output_bytes)?;
        let output = ready.run(input, output)?;

        let values = output.decode()?;
        self.config
            .decoding
            .decode(&values, &ready.output_shape, vocabulary)
    }

    /// Like [`InferenceAdapter::generate`], with failures folded into the sentinel texts the game
    /// displays ([`UNLOADED_SENTINEL`](crate::UNLOADED_SENTINEL) or
    /// [`GENERATION_FAILED_SENTINEL`](crate::GENERATION_FAILED_SENTINEL)).
    pub fn generate_word(&self, prompt: &str) -> String {
        self.generate(prompt)
            .unwrap_or_else(|e| e.sentinel().to_string())
    }
}

fn load_vocabulary<A: AssetStore + ?Sized>(store: &A, name: &str) -> Option<Vocabulary> {
    let asset = match store.resolve(name) {
        Ok(asset) => asset,
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Vocabulary unavailable: {e}");
            return None;
        }
    };
    match Vocabulary::from_json_slice(asset.as_bytes()) {
        Ok(vocab) if !vocab.is_empty() => {
            log::debug!(target: LOG_TARGET, "Loaded vocabulary '{name}' ({} tokens)", vocab.len());
            Some(vocab)
        }
        Ok(_) => {
            log::warn!(target: LOG_TARGET, "Vocabulary '{name}' is empty");
            None
        }
        Err(e) => {
            log::warn!(target: LOG_TARGET, "Vocabulary '{name}' is malformed: {e}");
            None
        }
    }
}

impl Debug for InferenceAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("InferenceAdapter");
        s.field("status", &self.status());
        match &self.state {
            AdapterState::Ready(ready) => s
                .field("asset", &ready.asset)
                .field("input_shape", &ready.input_shape.dims())
                .field("output_shape", &ready.output_shape.dims()),
            AdapterState::Unloaded(e) => s.field("load_failure", &e.kind()),
        };
        s.finish()
    }
}
