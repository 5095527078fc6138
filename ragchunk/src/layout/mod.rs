//! Structural primitives recovered from source documents.
//!
//! PDF pages are stored as a small arena: a [`PageLayout`] owns flat vectors of
//! blocks, lines and spans, and parents refer to their children through index
//! ranges. This keeps the page → block → line → span tree free of ownership
//! cycles and makes it cheap to sort blocks by position.

use std::ops::Range;

mod cmap;
pub mod docx;
mod fonts;
pub mod pdf;

pub use docx::{DocxBlock, read_docx_blocks};
pub use pdf::{PdfPage, read_pdf_pages};

/// Axis-aligned rectangle in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        (left < right && top < bottom).then_some(Rect {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Font styling relevant to Markdown reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct StyleFlags {
    pub monospace: bool,
    pub bold: bool,
    pub italic: bool,
}

impl StyleFlags {
    pub const PLAIN: StyleFlags = StyleFlags {
        monospace: false,
        bold: false,
        italic: false,
    };

    pub fn union(self, other: StyleFlags) -> StyleFlags {
        StyleFlags {
            monospace: self.monospace || other.monospace,
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
        }
    }
}

/// Rounds a font size to the integer key used for heading detection.
pub fn round_font_size(size: f32) -> u32 {
    if size.is_finite() && size > 0.0 {
        size.round() as u32
    } else {
        0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub bbox: Rect,
    /// Unrounded font size in layout units.
    pub size: f32,
    pub flags: StyleFlags,
}

impl TextSpan {
    pub fn rounded_size(&self) -> u32 {
        round_font_size(self.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub bbox: Rect,
    /// Writing direction as a unit vector; `(1, 0)` is left-to-right horizontal.
    pub dir: (f32, f32),
    pub spans: Range<usize>,
}

impl Line {
    /// True for both upright and upside-down text.
    pub fn is_horizontal(&self) -> bool {
        is_horizontal(self.dir)
    }
}

pub(crate) fn is_horizontal(dir: (f32, f32)) -> bool {
    dir.1.abs() < 1e-3
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub bbox: Rect,
    pub lines: Range<usize>,
}

/// One page's text blocks in reading order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub blocks: Vec<Block>,
    pub lines: Vec<Line>,
    pub spans: Vec<TextSpan>,
}

impl PageLayout {
    pub fn block_lines(&self, block: &Block) -> &[Line] {
        &self.lines[block.lines.clone()]
    }

    pub fn line_spans(&self, line: &Line) -> &[TextSpan] {
        &self.spans[line.spans.clone()]
    }

    /// Appends a block made of the given lines, each a list of spans.
    pub fn push_block(&mut self, lines: Vec<(Vec<TextSpan>, (f32, f32))>) {
        let line_start = self.lines.len();
        let mut block_box: Option<Rect> = None;
        for (spans, dir) in lines {
            if spans.is_empty() {
                continue;
            }
            let span_start = self.spans.len();
            let line_box = spans
                .iter()
                .map(|span| span.bbox)
                .reduce(|acc, bbox| acc.union(&bbox))
                .unwrap_or_default();
            self.spans.extend(spans);
            self.lines.push(Line {
                bbox: line_box,
                dir,
                spans: span_start..self.spans.len(),
            });
            block_box = Some(match block_box {
                Some(bbox) => bbox.union(&line_box),
                None => line_box,
            });
        }
        if let Some(bbox) = block_box {
            self.blocks.push(Block {
                bbox,
                lines: line_start..self.lines.len(),
            });
        }
    }
}

/// A URI hyperlink annotation and its clickable area.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOverlay {
    pub uri: String,
    pub hot_zone: Rect,
}
