//! Prompt encoding and output decoding.
//!
//! The defaults ([`PromptEncoding::FixedToken`] with token `1`, [`DecodingPolicy::RawFloats`])
//! ignore the prompt and print the raw output values. The vocabulary-backed policies are opt-in
//! and fall back to the defaults when no vocabulary is available.
use crate::InferenceError;
use crate::buffer::{InputEncoding, OutputValues};
use crate::config::{DecodingPolicy, PromptEncoding};
use crate::shape::TensorShape;
use crate::vocab::Vocabulary;

impl PromptEncoding {
    pub fn encode(&self, prompt: &str, vocabulary: Option<&Vocabulary>) -> InputEncoding {
        match *self {
            PromptEncoding::FixedToken { token } => InputEncoding::single_token(token),
            PromptEncoding::LastWord { fallback_token } => {
                let token = vocabulary
                    .zip(prompt.split_whitespace().last())
                    .and_then(|(vocab, word)| vocab.word_id(word))
                    .unwrap_or(fallback_token);
                InputEncoding::single_token(token)
            }
        }
    }
}

impl DecodingPolicy {
    pub fn decode(
        &self,
        values: &OutputValues,
        shape: &TensorShape,
        vocabulary: Option<&Vocabulary>,
    ) -> Result<String, InferenceError> {
        match (self, vocabulary) {
            (DecodingPolicy::ArgmaxToken, Some(vocab)) => argmax_token(values, shape, vocab),
            _ => Ok(join_floats(values)),
        }
    }
}

/// Space-joined rendering of every value (`0.1 0.2 1.0 NaN`).
///
/// Values use the shortest digits that round-trip, laid out like the game's existing output:
/// plain decimals for magnitudes in `[1e-3, 1e7)`, `1.0E-5` style otherwise, and `Infinity`.
pub fn join_floats(values: &[f32]) -> String {
    values
        .iter()
        .map(|&v| format_float(v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return format!("{value:?}");
    }
    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => scientific,
    }
}

fn argmax_token(
    values: &[f32],
    shape: &TensorShape,
    vocab: &Vocabulary,
) -> Result<String, InferenceError> {
    let row_len = shape.last_dim();
    let row_start = values.len().saturating_sub(row_len);
    let row = &values[row_start..];

    let best = row
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, top)) if top >= v => best,
            _ => Some((i, v)),
        });
    let (index, _) =
        best.ok_or_else(|| InferenceError::Decoding("output row holds only NaN values".into()))?;

    let id = i32::try_from(index)
        .map_err(|_| InferenceError::Decoding(format!("token index {index} exceeds i32")))?;
    vocab
        .display_token(id)
        .map(str::to_string)
        .ok_or_else(|| InferenceError::Decoding(format!("token id {id} is not in the vocabulary")))
}
