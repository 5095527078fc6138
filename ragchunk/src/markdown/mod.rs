//! Markdown rendering of extracted layout.

pub mod headers;
pub mod page;
pub mod table;

pub use headers::{FontSizeHistogram, HeaderSizeMap};
pub use page::{CodeMode, PageRenderer, render_page};
pub use table::{dedup_row_cells, render_table};
