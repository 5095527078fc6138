use std::{fmt, sync::Arc};

use tracing::{debug, info};

use crate::{
    error::{ExtractError, ExtractResult},
    layout::{read_docx_blocks, read_pdf_pages},
    markdown::{HeaderSizeMap, PageRenderer},
};

use super::{
    chunker::{Chunk, ChunkConfig, ChunkSequence, TokenizerChunker},
    document_manager::normalize_extension,
    utils::Tokenizer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Maps a file extension (with or without the leading dot) to a format.
    pub fn from_extension(ext: &str) -> ExtractResult<Self> {
        match normalize_extension(ext).as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observes extraction progress: `done` of `total` pages or blocks.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, done: usize, total: usize);
}

/// Turns raw document bytes into ordered chunks.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], config: &ChunkConfig) -> ExtractResult<Vec<Chunk>>;
}

#[derive(Clone)]
pub struct PdfExtractor {
    chunker: TokenizerChunker,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl PdfExtractor {
    pub fn new(chunker: TokenizerChunker, progress: Option<Arc<dyn ProgressSink>>) -> Self {
        Self { chunker, progress }
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], config: &ChunkConfig) -> ExtractResult<Vec<Chunk>> {
        let pages = read_pdf_pages(bytes)?;
        let headers =
            HeaderSizeMap::from_spans(pages.iter().flat_map(|page| page.layout.spans.iter()));

        let total = pages.len();
        let mut sequence = ChunkSequence::default();
        for (idx, page) in pages.iter().enumerate() {
            let markdown = PageRenderer::new(&headers, &page.links)
                .with_link_coverage(config.link_coverage)
                .render(&page.layout);
            let kept = self
                .chunker
                .push_page(&mut sequence, page.number, &markdown, config);
            debug!(page = page.number, kept, "page rendered");
            report(self.progress.as_deref(), idx + 1, total);
        }

        info!(pages = total, chunks = sequence.len(), "pdf extracted");
        sequence.finish()
    }
}

#[derive(Clone)]
pub struct DocxExtractor {
    chunker: TokenizerChunker,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl DocxExtractor {
    pub fn new(chunker: TokenizerChunker, progress: Option<Arc<dyn ProgressSink>>) -> Self {
        Self { chunker, progress }
    }
}

impl DocumentExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8], config: &ChunkConfig) -> ExtractResult<Vec<Chunk>> {
        let blocks = read_docx_blocks(bytes)?;

        let total = blocks.len();
        let mut session = self.chunker.docx_session(config);
        for (idx, block) in blocks.iter().enumerate() {
            session.push_block(block);
            report(self.progress.as_deref(), idx + 1, total);
        }

        let sequence = session.finish();
        info!(blocks = total, chunks = sequence.len(), "docx extracted");
        sequence.finish()
    }
}

/// Extracts page chunks from PDF bytes.
pub fn extract_pdf_chunks(
    bytes: &[u8],
    tokenizer: Arc<dyn Tokenizer>,
    config: &ChunkConfig,
) -> ExtractResult<Vec<Chunk>> {
    PdfExtractor::new(TokenizerChunker::new(tokenizer), None).extract(bytes, config)
}

/// Extracts table and paragraph chunks from DOCX bytes.
pub fn extract_docx_chunks(
    bytes: &[u8],
    tokenizer: Arc<dyn Tokenizer>,
    config: &ChunkConfig,
) -> ExtractResult<Vec<Chunk>> {
    DocxExtractor::new(TokenizerChunker::new(tokenizer), None).extract(bytes, config)
}

fn report(sink: Option<&dyn ProgressSink>, done: usize, total: usize) {
    if let Some(sink) = sink {
        sink.on_progress(done, total);
    }
}
