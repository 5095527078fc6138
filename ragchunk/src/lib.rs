//! Layout-aware extraction of PDF and DOCX documents into token-bounded
//! chunks for retrieval-augmented generation.

pub mod config;
pub mod error;
pub mod layout;
pub mod markdown;
pub mod pipeline;

pub use config::{AppConfig, load_config};
pub use error::{ExtractError, ExtractResult};
pub use pipeline::{
    Chunk, ChunkConfig, DocumentFormat, Pipeline, ProgressSink, Tokenizer, extract_docx_chunks,
    extract_pdf_chunks,
};
