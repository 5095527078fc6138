use std::{fmt, sync::Arc};

use serde::Serialize;
use tracing::debug;

use crate::{
    error::{ExtractError, ExtractResult},
    layout::DocxBlock,
    markdown::render_table,
};

use super::utils::Tokenizer;

/// A token-bounded piece of a document, ready for embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position in the document's chunk sequence (reading order).
    pub sequence_index: usize,
    /// Locator line followed by the chunk text.
    pub content: String,
    /// Machine-readable origin, e.g. `Page: 3`.
    pub location_label: String,
    /// Tokens in the chunk text, excluding the locator line.
    pub token_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkConfig {
    /// PDF pages with fewer tokens are dropped.
    pub min_tokens: usize,
    /// DOCX paragraphs accumulate into one chunk up to this many tokens.
    pub paragraph_token_limit: usize,
    /// Share of a span's area a link hot zone must cover.
    pub link_coverage: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            min_tokens: 10,
            paragraph_token_limit: 400,
            link_coverage: 0.7,
        }
    }
}

/// Where a chunk came from. Pages are 1-indexed, tables and paragraphs 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSource {
    Page(usize),
    Table(usize),
    Paragraph(usize),
}

impl ChunkSource {
    pub fn label(&self) -> String {
        self.to_string()
    }

    fn render(&self, body: &str) -> String {
        match self {
            ChunkSource::Page(n) => format!("Page No: {n}\nPage Text:\n```\n{body}\n```"),
            ChunkSource::Table(n) => format!("Table No: {n}\nTable Text:\n```\n{body}\n```"),
            ChunkSource::Paragraph(n) => format!("Paragraph No: {n}\n{body}"),
        }
    }
}

impl fmt::Display for ChunkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkSource::Page(n) => write!(f, "Page: {n}"),
            ChunkSource::Table(n) => write!(f, "Table: {n}"),
            ChunkSource::Paragraph(n) => write!(f, "Paragraph: {n}"),
        }
    }
}

/// Ordered chunk output of one extraction run.
#[derive(Debug, Default, Clone)]
pub struct ChunkSequence {
    chunks: Vec<Chunk>,
}

impl ChunkSequence {
    /// Appends a chunk; blank bodies are ignored.
    pub fn push(&mut self, source: ChunkSource, body: &str, token_count: usize) -> bool {
        let body = body.trim();
        if body.is_empty() {
            return false;
        }
        self.chunks.push(Chunk {
            sequence_index: self.chunks.len(),
            content: source.render(body),
            location_label: source.label(),
            token_count,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunks, or [`ExtractError::EmptyExtraction`] when nothing qualified.
    pub fn finish(self) -> ExtractResult<Vec<Chunk>> {
        if self.chunks.is_empty() {
            return Err(ExtractError::EmptyExtraction);
        }
        Ok(self.chunks)
    }
}

/// Greedy paragraph accumulation under a token ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParagraphAccumulator {
    #[default]
    Empty,
    Filling {
        buffer: String,
    },
}

impl ParagraphAccumulator {
    /// Feeds one paragraph. Returns the next state and the buffer flushed by
    /// this step, if the paragraph would have pushed it over `limit`.
    pub fn push(
        self,
        paragraph: &str,
        limit: usize,
        tokenizer: &dyn Tokenizer,
    ) -> (ParagraphAccumulator, Option<String>) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            return (self, None);
        }
        match self {
            ParagraphAccumulator::Empty => (Self::start(paragraph), None),
            ParagraphAccumulator::Filling { mut buffer } => {
                let total =
                    tokenizer.count_tokens(paragraph) + tokenizer.count_tokens(&buffer);
                if total > limit {
                    (Self::start(paragraph), Some(buffer))
                } else {
                    buffer.push_str(paragraph);
                    buffer.push('\n');
                    (ParagraphAccumulator::Filling { buffer }, None)
                }
            }
        }
    }

    /// The remaining buffer, if any.
    pub fn finish(self) -> Option<String> {
        match self {
            ParagraphAccumulator::Empty => None,
            ParagraphAccumulator::Filling { buffer } => Some(buffer),
        }
    }

    fn start(paragraph: &str) -> Self {
        ParagraphAccumulator::Filling {
            buffer: format!("{paragraph}\n"),
        }
    }
}

/// Applies the token-budget policies with a shared tokenizer.
#[derive(Clone)]
pub struct TokenizerChunker {
    tokenizer: Arc<dyn Tokenizer>,
}

impl TokenizerChunker {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    /// One chunk per page; pages under `min_tokens` are dropped.
    pub fn push_page(
        &self,
        sequence: &mut ChunkSequence,
        page_number: usize,
        markdown: &str,
        config: &ChunkConfig,
    ) -> bool {
        let tokens = self.tokenizer.count_tokens(markdown);
        if tokens < config.min_tokens {
            debug!(page = page_number, tokens, "page below token threshold, skipped");
            return false;
        }
        sequence.push(ChunkSource::Page(page_number), markdown, tokens)
    }

    pub fn docx_session<'a>(&'a self, config: &'a ChunkConfig) -> DocxChunking<'a> {
        DocxChunking {
            chunker: self,
            config,
            accumulator: ParagraphAccumulator::Empty,
            table_index: 0,
            paragraph_index: 0,
            sequence: ChunkSequence::default(),
        }
    }
}

/// DOCX chunking state carried from block to block.
pub struct DocxChunking<'a> {
    chunker: &'a TokenizerChunker,
    config: &'a ChunkConfig,
    accumulator: ParagraphAccumulator,
    table_index: usize,
    paragraph_index: usize,
    sequence: ChunkSequence,
}

impl DocxChunking<'_> {
    pub fn push_block(&mut self, block: &DocxBlock) {
        match block {
            DocxBlock::Table(rows) => {
                let Some(markdown) = render_table(rows) else {
                    return;
                };
                // Paragraphs before a table are emitted before it.
                self.flush_pending();
                let tokens = self.chunker.tokenizer.count_tokens(&markdown);
                if self
                    .sequence
                    .push(ChunkSource::Table(self.table_index), &markdown, tokens)
                {
                    self.table_index += 1;
                }
            }
            DocxBlock::Paragraph(text) => {
                let state = std::mem::take(&mut self.accumulator);
                let (next, flushed) = state.push(
                    text,
                    self.config.paragraph_token_limit,
                    self.chunker.tokenizer(),
                );
                self.accumulator = next;
                if let Some(buffer) = flushed {
                    self.flush_paragraphs(&buffer);
                }
            }
        }
    }

    pub fn finish(mut self) -> ChunkSequence {
        self.flush_pending();
        self.sequence
    }

    fn flush_pending(&mut self) {
        if let Some(buffer) = std::mem::take(&mut self.accumulator).finish() {
            self.flush_paragraphs(&buffer);
        }
    }

    fn flush_paragraphs(&mut self, buffer: &str) {
        let tokens = self.chunker.tokenizer.count_tokens(buffer);
        if self
            .sequence
            .push(ChunkSource::Paragraph(self.paragraph_index), buffer, tokens)
        {
            self.paragraph_index += 1;
        }
    }
}
