use std::{collections::HashSet, io, path::Path, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ExtractError, ExtractResult};

use super::extractor::DocumentFormat;

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    async fn file_size(&self, path: &Path) -> io::Result<u64>;
}

#[derive(Debug, Default, Clone)]
pub struct FsFileRepository;

#[async_trait]
impl FileRepository for FsFileRepository {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }
}

/// Validates input files against the intake policy before extraction.
#[derive(Clone)]
pub struct DocumentManager {
    supported_extensions: HashSet<String>,
    max_file_size: u64,
    file_repo: Arc<dyn FileRepository>,
}

impl DocumentManager {
    pub fn new<S: AsRef<str>>(supported_extensions: &[S], max_file_size: u64) -> Self {
        Self::with_repository(
            supported_extensions,
            max_file_size,
            Arc::new(FsFileRepository),
        )
    }

    pub fn with_repository<S: AsRef<str>>(
        supported_extensions: &[S],
        max_file_size: u64,
        file_repo: Arc<dyn FileRepository>,
    ) -> Self {
        let supported_extensions = supported_extensions
            .iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        Self {
            supported_extensions,
            max_file_size,
            file_repo,
        }
    }

    pub fn is_supported_file(&self, path: impl AsRef<Path>) -> bool {
        match file_extension(path.as_ref()) {
            Some(ext) => self.supported_extensions.contains(&ext),
            None => false,
        }
    }

    /// Checks the allow-list and size limit, then reads the file.
    pub async fn load(&self, path: &Path) -> ExtractResult<(DocumentFormat, Vec<u8>)> {
        if !self.is_supported_file(path) {
            return Err(ExtractError::UnsupportedFormat(
                file_extension(path).unwrap_or_default(),
            ));
        }
        let ext = file_extension(path).unwrap_or_default();
        let format = DocumentFormat::from_extension(&ext)?;

        let size = self.file_repo.file_size(path).await?;
        if size > self.max_file_size {
            return Err(ExtractError::FileTooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = self.file_repo.read(path).await?;
        if bytes.is_empty() {
            return Err(ExtractError::CorruptDocument("file is empty".to_string()));
        }
        debug!(path = %path.display(), %format, bytes = bytes.len(), "file loaded");
        Ok((format, bytes))
    }
}

pub fn normalize_extension(ext: &str) -> String {
    if let Some(stripped) = ext.strip_prefix('.') {
        stripped.to_ascii_lowercase()
    } else {
        ext.to_ascii_lowercase()
    }
}

fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|os| os.to_str())
        .map(normalize_extension)
}
