use std::{path::Path, sync::Arc};

use anyhow::Context;
use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::{ExtractError, ExtractResult},
};

use super::{
    chunker::{Chunk, ChunkConfig, TokenizerChunker},
    document_manager::DocumentManager,
    extractor::{DocumentExtractor, DocumentFormat, DocxExtractor, PdfExtractor, ProgressSink},
    utils::{TiktokenTokenizer, Tokenizer},
};

/// Document bytes in, ordered chunks out.
#[derive(Clone)]
pub struct Pipeline {
    doc_manager: DocumentManager,
    config: ChunkConfig,
    pdf: Arc<dyn DocumentExtractor>,
    docx: Arc<dyn DocumentExtractor>,
}

impl Pipeline {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let tokenizer: Arc<dyn Tokenizer> =
            Arc::new(TiktokenTokenizer::new().context("failed to initialize tokenizer")?);
        let doc_manager = DocumentManager::new(
            config.intake.allowed_extensions.as_slice(),
            config.intake.max_file_size_bytes(),
        );

        Ok(Self::with_dependencies(
            config.extraction.chunk_config(),
            tokenizer,
            doc_manager,
            None,
        ))
    }

    pub fn with_dependencies(
        config: ChunkConfig,
        tokenizer: Arc<dyn Tokenizer>,
        doc_manager: DocumentManager,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> Self {
        let chunker = TokenizerChunker::new(tokenizer);
        let pdf = Arc::new(PdfExtractor::new(chunker.clone(), progress.clone()));
        let docx = Arc::new(DocxExtractor::new(chunker, progress));
        Self {
            doc_manager,
            config,
            pdf,
            docx,
        }
    }

    pub fn document_manager(&self) -> &DocumentManager {
        &self.doc_manager
    }

    /// Synchronous extraction of an in-memory document.
    pub fn extract(&self, bytes: &[u8], format: DocumentFormat) -> ExtractResult<Vec<Chunk>> {
        self.extractor(format).extract(bytes, &self.config)
    }

    /// Validates and reads `path`, then extracts it on the blocking pool.
    pub async fn process_file(&self, path: &Path) -> ExtractResult<Vec<Chunk>> {
        let (format, bytes) = self.doc_manager.load(path).await?;
        info!(path = %path.display(), %format, bytes = bytes.len(), "extracting document");

        let result = self.extract_blocking(bytes, format).await;
        match &result {
            Ok(chunks) => info!(path = %path.display(), chunks = chunks.len(), "document chunked"),
            Err(err) => error!(path = %path.display(), error = %err, "extraction failed"),
        }
        result
    }

    /// Runs [`Pipeline::extract`] on tokio's blocking pool.
    pub async fn extract_blocking(
        &self,
        bytes: Vec<u8>,
        format: DocumentFormat,
    ) -> ExtractResult<Vec<Chunk>> {
        let extractor = self.extractor(format);
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&bytes, &config))
            .await
            .map_err(|err| ExtractError::Worker(err.to_string()))?
    }

    fn extractor(&self, format: DocumentFormat) -> Arc<dyn DocumentExtractor> {
        match format {
            DocumentFormat::Pdf => self.pdf.clone(),
            DocumentFormat::Docx => self.docx.clone(),
        }
    }
}
