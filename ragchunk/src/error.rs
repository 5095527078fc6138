use thiserror::Error;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    /// Extraction ran to completion but every page or block was filtered out.
    #[error("extraction produced no chunks")]
    EmptyExtraction,

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction worker failed: {0}")]
    Worker(String),
}

impl ExtractError {
    pub(crate) fn corrupt(err: impl std::fmt::Display) -> Self {
        Self::CorruptDocument(err.to_string())
    }
}

impl From<lopdf::Error> for ExtractError {
    fn from(err: lopdf::Error) -> Self {
        Self::corrupt(err)
    }
}
