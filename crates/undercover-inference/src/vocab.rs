use std::collections::HashMap;

/// Marker GPT-2's byte-level tokenizer puts in front of tokens that follow a space.
pub const SPACE_MARKER: char = 'Ġ';

/// Token vocabulary in the `vocab.json` layout used by GPT-2 style tokenizers
/// (`{"token": id, ...}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    ids: HashMap<String, i32>,
    tokens: HashMap<i32, String>,
}

impl Vocabulary {
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let ids: HashMap<String, i32> = serde_json::from_slice(bytes)?;
        Ok(Self::from_map(ids))
    }

    pub fn from_map(ids: HashMap<String, i32>) -> Self {
        let tokens = ids.iter().map(|(t, &id)| (id, t.clone())).collect();
        Self { ids, tokens }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn token_id(&self, token: &str) -> Option<i32> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: i32) -> Option<&str> {
        self.tokens.get(&id).map(String::as_str)
    }

    /// Id of `word` as it would appear after a space, falling back to the bare word.
    pub fn word_id(&self, word: &str) -> Option<i32> {
        self.token_id(&format!("{SPACE_MARKER}{word}"))
            .or_else(|| self.token_id(word))
    }

    /// Token text with the leading space marker removed.
    pub fn display_token(&self, id: i32) -> Option<&str> {
        self.token(id)
            .map(|t| t.strip_prefix(SPACE_MARKER).unwrap_or(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VOCAB: &str = r#"{"!": 0, "hello": 1, "Ġspy": 2, "Ġcat": 3}"#;

    #[test]
    fn parses_gpt2_vocab_json() {
        let vocab = Vocabulary::from_json_slice(VOCAB.as_bytes()).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.token_id("hello"), Some(1));
        assert_eq!(vocab.token(2), Some("Ġspy"));
    }

    #[test]
    fn word_lookup_prefers_space_prefixed_token() {
        let vocab = Vocabulary::from_json_slice(VOCAB.as_bytes()).unwrap();
        assert_eq!(vocab.word_id("spy"), Some(2));
        assert_eq!(vocab.word_id("hello"), Some(1));
        assert_eq!(vocab.word_id("dog"), None);
    }

    #[test]
    fn display_strips_space_marker() {
        let vocab = Vocabulary::from_json_slice(VOCAB.as_bytes()).unwrap();
        assert_eq!(vocab.display_token(3), Some("cat"));
        assert_eq!(vocab.display_token(1), Some("hello"));
        assert_eq!(vocab.display_token(99), None);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Vocabulary::from_json_slice(b"[1, 2]").is_err());
    }
}
