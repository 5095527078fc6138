pub mod chunker;
pub mod document_manager;
pub mod extractor;
pub mod pipeline;

pub mod utils;

pub use chunker::{
    Chunk, ChunkConfig, ChunkSequence, ChunkSource, DocxChunking, ParagraphAccumulator,
    TokenizerChunker,
};
pub use document_manager::{
    DocumentManager, FileRepository, FsFileRepository, normalize_extension,
};
pub use extractor::{
    DocumentExtractor, DocumentFormat, DocxExtractor, PdfExtractor, ProgressSink,
    extract_docx_chunks, extract_pdf_chunks,
};
pub use pipeline::Pipeline;
pub use utils::{TiktokenTokenizer, Tokenizer, WhitespaceTokenizer};
