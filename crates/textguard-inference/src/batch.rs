//! Tokenization and batch building

use tokenizers::Tokenizer;

use textguard_core::{Error, Result};

/// A tokenized batch: parallel token-id and attention-mask rows, one per
/// input text, padded to a common length. Built and discarded per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedBatch {
    /// Token ids, one row per input text
    pub token_ids: Vec<Vec<u32>>,

    /// Attention mask mirroring the token-id shape: 1 for real tokens,
    /// 0 for padding
    pub attention_mask: Vec<Vec<u32>>,
}

impl TokenizedBatch {
    /// Number of rows (input texts) in the batch.
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    /// Whether the batch has no rows.
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }

    /// Common padded length shared by every row.
    pub fn seq_len(&self) -> usize {
        self.token_ids.first().map_or(0, Vec::len)
    }
}

/// Converts raw texts into fixed-shape token-id and attention-mask rows.
///
/// Wraps the loaded tokenizer together with the configured default maximum
/// sequence length. Read-only after construction.
pub struct BatchBuilder {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl BatchBuilder {
    /// Wrap an already-loaded tokenizer.
    pub fn new(tokenizer: Tokenizer, max_length: usize) -> Self {
        Self {
            tokenizer,
            max_length,
        }
    }

    /// Load the tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<std::path::Path>, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            Error::tokenization(format!("failed to load tokenizer {}: {}", path.display(), e))
        })?;
        Ok(Self::new(tokenizer, max_length))
    }

    /// Default maximum sequence length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Tokenize a batch of texts.
    ///
    /// Each text is split into sub-word tokens, truncated to the effective
    /// length (the explicit `max_length` if given, otherwise the configured
    /// default), and right-padded so every row shares the batch-wide common
    /// length: the longest row, capped at the effective length. Empty strings
    /// are not special-cased; they produce a minimal row plus padding.
    pub fn encode(&self, texts: &[String], max_length: Option<usize>) -> Result<TokenizedBatch> {
        let effective = max_length.unwrap_or(self.max_length);

        let inputs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encodings = self
            .tokenizer
            .encode_batch(inputs, true)
            .map_err(|e| Error::tokenization(format!("encoding failed: {}", e)))?;

        let width = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0)
            .min(effective);

        let mut token_ids = Vec::with_capacity(encodings.len());
        let mut attention_mask = Vec::with_capacity(encodings.len());

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let real = ids.len().min(width);

            let mut row = Vec::with_capacity(width);
            row.extend_from_slice(&ids[..real]);
            row.resize(width, 0);

            let mut mask = vec![1u32; real];
            mask.resize(width, 0);

            token_ids.push(row);
            attention_mask.push(mask);
        }

        Ok(TokenizedBatch {
            token_ids,
            attention_mask,
        })
    }
}
