use anyhow::Result;
use sha2::{Digest, Sha256};
use tiktoken_rs::{CoreBPE, o200k_base};

/// Token counter shared by every chunking policy so budgets stay comparable.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn count_tokens(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}

/// `o200k_base`, the BPE vocabulary of gpt-4o and its embedding models.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn new() -> Result<Self> {
        let bpe = o200k_base()?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        self.bpe.encode_with_special_tokens(text)
    }
}

/// Counts whitespace-separated words; deterministic budgets for tests and tooling.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn encode(&self, text: &str) -> Vec<u32> {
        text.split_whitespace()
            .enumerate()
            .map(|(idx, _)| idx as u32)
            .collect()
    }

    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// `prefix` followed by the SHA-256 hex digest of `content`.
pub fn compute_mdhash_id(content: impl AsRef<[u8]>, prefix: &str) -> String {
    let digest = Sha256::digest(content.as_ref());
    let mut id = String::with_capacity(prefix.len() + digest.len() * 2);
    id.push_str(prefix);
    for byte in digest {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}
