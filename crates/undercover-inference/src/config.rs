use serde::{Deserialize, Serialize};
use std::path::Path;

/// Asset name of the bundled word-generation model.
pub const DEFAULT_MODEL_ASSET: &str = "distilgpt2_model.tflite";

/// Default ceiling on the output buffer size (64 MiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: u64 = 64 * 1024 * 1024;

/// Token fed to the model when the prompt is not used.
pub const DEFAULT_TOKEN: i32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("Invalid adapter configuration: {0}")]
    Invalid(String),
}

/// How a prompt becomes the model's input tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromptEncoding {
    /// Ignore the prompt and always feed `token`.
    FixedToken { token: i32 },
    /// Feed the vocabulary id of the prompt's last word, or `fallback_token` when unknown.
    LastWord { fallback_token: i32 },
}

impl Default for PromptEncoding {
    fn default() -> Self {
        PromptEncoding::FixedToken {
            token: DEFAULT_TOKEN,
        }
    }
}

/// How output values become text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodingPolicy {
    /// Every output value, space separated.
    #[default]
    RawFloats,
    /// The vocabulary token with the highest score in the last output row.
    ArgmaxToken,
}

/// Adapter settings, usually read from a TOML file shipped next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdapterConfig {
    pub model_asset: String,
    pub max_output_bytes: u64,
    pub prompt_encoding: PromptEncoding,
    pub decoding: DecodingPolicy,
    pub vocabulary_asset: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            model_asset: DEFAULT_MODEL_ASSET.to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            prompt_encoding: PromptEncoding::default(),
            decoding: DecodingPolicy::default(),
            vocabulary_asset: None,
        }
    }
}

impl AdapterConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AdapterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn with_model_asset(mut self, name: impl Into<String>) -> Self {
        self.model_asset = name.into();
        self
    }

    pub fn with_max_output_bytes(mut self, max: u64) -> Self {
        self.max_output_bytes = max;
        self
    }

    pub fn with_vocabulary(
        mut self,
        asset: impl Into<String>,
        prompt_encoding: PromptEncoding,
        decoding: DecodingPolicy,
    ) -> Self {
        self.vocabulary_asset = Some(asset.into());
        self.prompt_encoding = prompt_encoding;
        self.decoding = decoding;
        self
    }

    /// Whether a policy needs a vocabulary to do its job.
    pub fn needs_vocabulary(&self) -> bool {
        matches!(self.prompt_encoding, PromptEncoding::LastWord { .. })
            || self.decoding == DecodingPolicy::ArgmaxToken
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_asset.trim().is_empty() {
            return Err(ConfigError::Invalid("model_asset must not be empty".into()));
        }
        if self.max_output_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_output_bytes must be greater than zero".into(),
            ));
        }
        if self.needs_vocabulary() && self.vocabulary_asset.is_none() {
            return Err(ConfigError::Invalid(
                "vocabulary_asset is required by the selected prompt encoding or decoding".into(),
            ));
        }
        Ok(())
    }
}
