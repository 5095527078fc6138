//! PDF layout extraction on top of `lopdf`.
//!
//! Each page's content stream is interpreted just far enough to place every
//! shown glyph: graphics state (`q`, `Q`, `cm`), text state and positioning
//! operators, the four text-showing operators, and form XObjects. Glyphs are
//! then grouped into spans, lines and blocks.

use std::{borrow::Cow, cmp::Ordering, collections::HashMap};

use lopdf::{Dictionary, Document, Object, ObjectId, content::Content};
use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};

use super::{
    LinkOverlay, PageLayout, Rect, StyleFlags, TextSpan,
    is_horizontal,
    fonts::{FontInfo, as_dict, get, get_dict, name, number, resolve, stream_bytes},
};

const MAX_FORM_DEPTH: usize = 8;
/// Ascent and descent as fractions of the font size, used for glyph boxes.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;
const BASELINE_TOLERANCE: f32 = 0.5;
const LINE_SPLIT_GAP: f32 = 3.0;
const WORD_GAP: f32 = 0.25;
const BLOCK_GAP: f32 = 0.5;

/// One page of a PDF: its text layout and URI link annotations.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// 1-indexed page number.
    pub number: usize,
    pub layout: PageLayout,
    pub links: Vec<LinkOverlay>,
}

/// Loads a PDF and extracts the layout of every page in page order.
///
/// Any page whose content stream cannot be decoded fails the whole document.
pub fn read_pdf_pages(bytes: &[u8]) -> ExtractResult<Vec<PdfPage>> {
    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(ExtractError::CorruptDocument(
            "PDF has no pages".to_string(),
        ));
    }

    let mut fonts = FontCache::default();
    let mut out = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let (layout, links) = read_page(&doc, page_id, &mut fonts).map_err(|err| {
            ExtractError::CorruptDocument(format!("page {number}: {err}"))
        })?;
        debug!(
            page = number,
            spans = layout.spans.len(),
            links = links.len(),
            "PDF page laid out"
        );
        out.push(PdfPage {
            number: number as usize,
            layout,
            links,
        });
    }
    Ok(out)
}

fn read_page(
    doc: &Document,
    page_id: ObjectId,
    fonts: &mut FontCache,
) -> ExtractResult<(PageLayout, Vec<LinkOverlay>)> {
    let page = doc.get_dictionary(page_id)?;
    let frame = PageFrame::from_media_box(inherited(doc, page, b"MediaBox"));
    let empty = Dictionary::new();
    let resources = inherited(doc, page, b"Resources")
        .and_then(as_dict)
        .unwrap_or(&empty);

    let content = doc.get_page_content(page_id)?;
    let mut interpreter = Interpreter {
        doc,
        fonts,
        frame,
        glyphs: Vec::new(),
    };
    interpreter.run(&content, resources, GraphicsState::default(), 0)?;
    let glyphs = interpreter.glyphs;

    Ok((build_layout(glyphs), page_links(doc, page, frame)))
}

/// Looks a key up on the page, then through its `/Parent` chain.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..32 {
        if let Some(value) = get(doc, current, key) {
            return Some(value);
        }
        current = get_dict(doc, current, b"Parent")?;
    }
    None
}

/// Maps PDF user space (origin bottom-left) to top-down page coordinates.
#[derive(Debug, Clone, Copy)]
struct PageFrame {
    left: f32,
    top: f32,
}

impl PageFrame {
    fn from_media_box(media_box: Option<&Object>) -> Self {
        let values: Vec<f32> = match media_box {
            Some(Object::Array(items)) => items.iter().filter_map(number).collect(),
            _ => Vec::new(),
        };
        match values.as_slice() {
            [x0, y0, x1, y1] => Self {
                left: x0.min(*x1),
                top: y0.max(*y1),
            },
            _ => Self {
                left: 0.0,
                top: 792.0,
            },
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.left, self.top - y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f32, ty: f32) -> Matrix {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        let values: Vec<f32> = operands.iter().filter_map(number).collect();
        let values: [f32; 6] = values.try_into().ok()?;
        Some(Matrix(values))
    }

    /// `self × other` in PDF row-vector convention.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<usize>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Default)]
struct FontCache {
    fonts: Vec<FontInfo>,
    by_object: HashMap<ObjectId, usize>,
}

impl FontCache {
    fn resolve_font(&mut self, doc: &Document, resources: &Dictionary, font_name: &[u8]) -> usize {
        let entry = get_dict(doc, resources, b"Font").and_then(|fonts| fonts.get(font_name).ok());
        let object_id = match entry {
            Some(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if let Some(idx) = object_id.and_then(|id| self.by_object.get(&id)) {
            return *idx;
        }

        let info = match entry.and_then(|obj| resolve(doc, obj)).and_then(as_dict) {
            Some(dict) => FontInfo::load(doc, dict),
            None => {
                warn!(
                    font = %String::from_utf8_lossy(font_name),
                    "font resource missing, using defaults"
                );
                FontInfo::fallback()
            }
        };
        self.fonts.push(info);
        let idx = self.fonts.len() - 1;
        if let Some(id) = object_id {
            self.by_object.insert(id, idx);
        }
        idx
    }
}

/// A positioned glyph in top-down page coordinates.
#[derive(Debug, Clone)]
struct Glyph {
    text: String,
    x0: f32,
    x1: f32,
    baseline: f32,
    size: f32,
    font: usize,
    flags: StyleFlags,
    dir: (f32, f32),
}

impl Glyph {
    fn is_horizontal(&self) -> bool {
        is_horizontal(self.dir)
    }

    /// Upside-down text advances right to left on the page.
    fn is_reversed(&self) -> bool {
        self.dir.0 < 0.0
    }
}

struct Interpreter<'a> {
    doc: &'a Document,
    fonts: &'a mut FontCache,
    frame: PageFrame,
    glyphs: Vec<Glyph>,
}

struct TextObject {
    matrix: Matrix,
    line_matrix: Matrix,
}

impl Interpreter<'_> {
    fn run(
        &mut self,
        content: &[u8],
        resources: &Dictionary,
        mut state: GraphicsState,
        depth: usize,
    ) -> ExtractResult<()> {
        let content = Content::decode(&strip_inline_images(content))?;
        let mut stack: Vec<GraphicsState> = Vec::new();
        let mut text = TextObject {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
        };

        for op in &content.operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => stack.push(state.clone()),
                "Q" => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                "cm" => {
                    if let Some(matrix) = Matrix::from_operands(operands) {
                        state.ctm = matrix.then(&state.ctm);
                    }
                }
                "BT" => {
                    text.matrix = Matrix::IDENTITY;
                    text.line_matrix = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let [font, size] = operands {
                        if let Some(font) = name(font) {
                            state.font = Some(self.fonts.resolve_font(self.doc, resources, font));
                        }
                        state.font_size = number(size).unwrap_or(state.font_size);
                    }
                }
                "Tc" => state.char_spacing = first_number(operands).unwrap_or(0.0),
                "Tw" => state.word_spacing = first_number(operands).unwrap_or(0.0),
                "Tz" => state.horizontal_scale = first_number(operands).unwrap_or(100.0) / 100.0,
                "TL" => state.leading = first_number(operands).unwrap_or(0.0),
                "Ts" => state.rise = first_number(operands).unwrap_or(0.0),
                "Td" | "TD" => {
                    let offsets = match operands {
                        [tx, ty] => number(tx).zip(number(ty)),
                        _ => None,
                    };
                    if let Some((tx, ty)) = offsets {
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        next_line(&mut text, tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(matrix) = Matrix::from_operands(operands) {
                        text.matrix = matrix;
                        text.line_matrix = matrix;
                    }
                }
                "T*" => next_line(&mut text, 0.0, -state.leading),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &state, &mut text);
                    }
                }
                "'" => {
                    next_line(&mut text, 0.0, -state.leading);
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &state, &mut text);
                    }
                }
                "\"" => {
                    if let [word, char_spacing, Object::String(bytes, _)] = operands {
                        state.word_spacing = number(word).unwrap_or(state.word_spacing);
                        state.char_spacing = number(char_spacing).unwrap_or(state.char_spacing);
                        next_line(&mut text, 0.0, -state.leading);
                        self.show(bytes, &state, &mut text);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes, &state, &mut text),
                                other => {
                                    if let Some(adjust) = number(other) {
                                        let tx = -adjust / 1000.0
                                            * state.font_size
                                            * state.horizontal_scale;
                                        text.matrix = Matrix::translate(tx, 0.0).then(&text.matrix);
                                    }
                                }
                            }
                        }
                    }
                }
                "Do" => {
                    if let Some(xobject) = operands.first().and_then(name) {
                        self.draw_form(xobject, resources, &state, depth)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn draw_form(
        &mut self,
        xobject: &[u8],
        resources: &Dictionary,
        state: &GraphicsState,
        depth: usize,
    ) -> ExtractResult<()> {
        if depth >= MAX_FORM_DEPTH {
            warn!(depth, "form XObject nesting too deep, skipping");
            return Ok(());
        }
        let doc = self.doc;
        let Some(Object::Stream(stream)) = get_dict(doc, resources, b"XObject")
            .and_then(|xobjects| get(doc, xobjects, xobject))
        else {
            return Ok(());
        };
        if get(doc, &stream.dict, b"Subtype").and_then(name) != Some(b"Form".as_slice()) {
            return Ok(());
        }

        let form_matrix = get(doc, &stream.dict, b"Matrix")
            .and_then(|obj| match obj {
                Object::Array(items) => Matrix::from_operands(items),
                _ => None,
            })
            .unwrap_or(Matrix::IDENTITY);
        let form_resources = get_dict(doc, &stream.dict, b"Resources").unwrap_or(resources);

        let mut form_state = state.clone();
        form_state.ctm = form_matrix.then(&state.ctm);
        self.run(&stream_bytes(stream), form_resources, form_state, depth + 1)
    }

    fn show(&mut self, bytes: &[u8], state: &GraphicsState, text: &mut TextObject) {
        let Some(font_idx) = state.font else {
            return;
        };
        let font = &self.fonts.fonts[font_idx];
        let flags = font.flags;
        let decoded = font.decode(bytes);

        for glyph in decoded {
            let render = text.matrix.then(&state.ctm);
            let [_, _, c, d, _, _] = render.0;
            let size = state.font_size * (c * c + d * d).sqrt();

            let mut advance = glyph.width / 1000.0 * state.font_size + state.char_spacing;
            if glyph.is_word_space {
                advance += state.word_spacing;
            }
            advance *= state.horizontal_scale;

            let (sx, sy) = render.apply(0.0, state.rise);
            let (ex, ey) = render.apply(advance, state.rise);
            let dir = direction(&render);

            if !glyph.text.is_empty() {
                let (x0, baseline) = self.frame.point(sx, sy);
                let (x1, _) = self.frame.point(ex, ey);
                self.glyphs.push(Glyph {
                    text: glyph.text,
                    x0: x0.min(x1),
                    x1: x0.max(x1),
                    baseline,
                    size,
                    font: font_idx,
                    flags,
                    dir,
                });
            }
            text.matrix = Matrix::translate(advance, 0.0).then(&text.matrix);
        }
    }
}

/// Drops `BI … ID <data> EI` inline images, whose raw payload would otherwise
/// derail the content-stream parser and silently truncate the page.
fn strip_inline_images(content: &[u8]) -> Cow<'_, [u8]> {
    let mut out: Option<Vec<u8>> = None;
    let mut copied = 0;
    let mut pos = 0;
    while pos < content.len() {
        match content[pos] {
            b'(' => pos = skip_literal_string(content, pos),
            b'%' => {
                while pos < content.len() && !matches!(content[pos], b'\r' | b'\n') {
                    pos += 1;
                }
            }
            b'B' if is_keyword(content, pos, b"BI") => {
                let Some(end) = inline_image_end(content, pos + 2) else {
                    warn!("unterminated inline image, dropping the rest of the stream");
                    let buf = out.get_or_insert_with(Vec::new);
                    buf.extend_from_slice(&content[copied..pos]);
                    copied = content.len();
                    break;
                };
                let buf = out.get_or_insert_with(Vec::new);
                buf.extend_from_slice(&content[copied..pos]);
                buf.push(b' ');
                copied = end;
                pos = end;
            }
            _ => pos += 1,
        }
    }
    match out {
        Some(mut buf) => {
            buf.extend_from_slice(&content[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(content),
    }
}

fn is_pdf_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' | b'\0')
}

fn is_pdf_delimiter(byte: u8) -> bool {
    is_pdf_whitespace(byte) || b"()<>[]{}/%".contains(&byte)
}

/// True when `keyword` stands alone as a token at `pos`.
fn is_keyword(content: &[u8], pos: usize, keyword: &[u8]) -> bool {
    content[pos..].starts_with(keyword)
        && (pos == 0 || (is_pdf_delimiter(content[pos - 1]) && content[pos - 1] != b'/'))
        && content
            .get(pos + keyword.len())
            .is_none_or(|byte| is_pdf_delimiter(*byte))
}

/// Index just past the closing parenthesis of the literal string at `start`.
fn skip_literal_string(content: &[u8], start: usize) -> usize {
    let mut depth = 0usize;
    let mut pos = start;
    while pos < content.len() {
        match content[pos] {
            b'\\' => pos += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    content.len()
}

/// Index just past the `EI` closing the inline image whose dictionary starts
/// at `from`.
fn inline_image_end(content: &[u8], from: usize) -> Option<usize> {
    let data_start = (from..content.len())
        .find(|&pos| is_keyword(content, pos, b"ID"))
        .map(|pos| pos + 3)?;
    (data_start..content.len())
        .find(|&pos| {
            is_keyword(content, pos, b"EI") && is_pdf_whitespace(content[pos - 1])
        })
        .map(|pos| pos + 2)
}

fn next_line(text: &mut TextObject, tx: f32, ty: f32) {
    text.line_matrix = Matrix::translate(tx, ty).then(&text.line_matrix);
    text.matrix = text.line_matrix;
}

fn first_number(operands: &[Object]) -> Option<f32> {
    operands.first().and_then(number)
}

/// Writing direction in top-down coordinates, as a unit vector.
fn direction(render: &Matrix) -> (f32, f32) {
    let [a, b, ..] = render.0;
    let len = (a * a + b * b).sqrt();
    if len == 0.0 {
        (1.0, 0.0)
    } else {
        // The y axis flips between PDF user space and page coordinates.
        (a / len, -b / len)
    }
}

fn page_links(doc: &Document, page: &Dictionary, frame: PageFrame) -> Vec<LinkOverlay> {
    let Some(Object::Array(annots)) = get(doc, page, b"Annots") else {
        return Vec::new();
    };
    annots
        .iter()
        .filter_map(|annot| resolve(doc, annot).and_then(as_dict))
        .filter(|annot| get(doc, annot, b"Subtype").and_then(name) == Some(b"Link".as_slice()))
        .filter_map(|annot| {
            let action = get_dict(doc, annot, b"A")?;
            if get(doc, action, b"S").and_then(name) != Some(b"URI".as_slice()) {
                return None;
            }
            let uri = match get(doc, action, b"URI")? {
                Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
                _ => return None,
            };
            let rect: Vec<f32> = match get(doc, annot, b"Rect")? {
                Object::Array(items) => items
                    .iter()
                    .filter_map(|item| resolve(doc, item).and_then(number))
                    .collect(),
                _ => return None,
            };
            let [x0, y0, x1, y1] = rect.as_slice() else {
                return None;
            };
            let (left, top) = frame.point(*x0, *y0);
            let (right, bottom) = frame.point(*x1, *y1);
            Some(LinkOverlay {
                uri,
                hot_zone: Rect::new(left, top, right, bottom),
            })
        })
        .collect()
}

fn by_position(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

struct DraftLine {
    bbox: Rect,
    size: f32,
    dir: (f32, f32),
    spans: Vec<TextSpan>,
}

/// Groups glyphs into spans, lines and blocks, then sorts blocks into reading
/// order (top-to-bottom, then left-to-right).
fn build_layout(glyphs: Vec<Glyph>) -> PageLayout {
    let (mut horizontal, other): (Vec<Glyph>, Vec<Glyph>) =
        glyphs.into_iter().partition(Glyph::is_horizontal);

    horizontal.sort_by(|a, b| {
        a.is_reversed()
            .cmp(&b.is_reversed())
            .then(by_position(a.baseline, b.baseline))
            .then(by_position(a.x0, b.x0))
    });

    let mut lines: Vec<DraftLine> = Vec::new();
    let mut row: Vec<Glyph> = Vec::new();
    for glyph in horizontal {
        let same_row = row.first().is_some_and(|first| {
            first.is_reversed() == glyph.is_reversed()
                && (glyph.baseline - first.baseline).abs()
                    <= BASELINE_TOLERANCE * first.size.max(glyph.size)
        });
        if !same_row && !row.is_empty() {
            lines.extend(split_row(std::mem::take(&mut row)));
        }
        row.push(glyph);
    }
    if !row.is_empty() {
        lines.extend(split_row(row));
    }

    // Rotated or vertical runs keep their stream order; one line per direction run.
    let mut run: Vec<Glyph> = Vec::new();
    for glyph in other {
        if run.last().is_some_and(|last| last.dir != glyph.dir) {
            lines.extend(make_line(std::mem::take(&mut run)));
        }
        run.push(glyph);
    }
    if !run.is_empty() {
        lines.extend(make_line(run));
    }

    lines.sort_by(|a, b| {
        by_position(a.bbox.top, b.bbox.top).then(by_position(a.bbox.left, b.bbox.left))
    });

    let mut blocks: Vec<(Rect, Vec<DraftLine>)> = Vec::new();
    for line in lines {
        let target = blocks.iter().rposition(|(bbox, members)| {
            let same_dir = members.first().is_some_and(|m| m.dir == line.dir);
            let gap = line.bbox.top - bbox.bottom;
            same_dir
                && gap <= BLOCK_GAP * line.size
                && line.bbox.bottom > bbox.top
                && line.bbox.left < bbox.right
                && line.bbox.right > bbox.left
        });
        match target {
            Some(idx) => {
                let (bbox, members) = &mut blocks[idx];
                *bbox = bbox.union(&line.bbox);
                members.push(line);
            }
            None => blocks.push((line.bbox, vec![line])),
        }
    }

    blocks.sort_by(|(a, _), (b, _)| by_position(a.top, b.top).then(by_position(a.left, b.left)));

    let mut layout = PageLayout::default();
    for (_, members) in blocks {
        layout.push_block(
            members
                .into_iter()
                .map(|line| (line.spans, line.dir))
                .collect(),
        );
    }
    layout
}

/// Splits one baseline row at wide horizontal gaps (column gutters).
fn split_row(mut row: Vec<Glyph>) -> Vec<DraftLine> {
    row.sort_by(|a, b| by_position(a.x0, b.x0));
    if row.first().is_some_and(Glyph::is_reversed) {
        row.reverse();
    }
    let mut lines = Vec::new();
    let mut current: Vec<Glyph> = Vec::new();
    for glyph in row {
        let gutter = current.last().is_some_and(|prev| {
            advance_gap(prev.x0, prev.x1, &glyph) > LINE_SPLIT_GAP * prev.size.max(glyph.size)
        });
        if gutter {
            lines.extend(make_line(std::mem::take(&mut current)));
        }
        current.push(glyph);
    }
    lines.extend(make_line(current));
    lines
}

struct DraftSpan {
    head: Glyph,
    text: String,
    left: f32,
    right: f32,
}

fn make_line(glyphs: Vec<Glyph>) -> Option<DraftLine> {
    let dir = glyphs.first()?.dir;
    let mut drafts: Vec<DraftSpan> = Vec::new();
    for glyph in glyphs {
        if let Some(span) = drafts.last_mut() {
            if needs_space(&span.text, &glyph, span.left, span.right) {
                span.text.push(' ');
            }
            let same_style =
                span.head.font == glyph.font && (span.head.size - glyph.size).abs() < 0.01;
            if same_style {
                span.text.push_str(&glyph.text);
                span.left = span.left.min(glyph.x0);
                span.right = span.right.max(glyph.x1);
                continue;
            }
        }
        drafts.push(DraftSpan {
            text: glyph.text.clone(),
            left: glyph.x0,
            right: glyph.x1,
            head: glyph,
        });
    }

    let spans: Vec<TextSpan> = drafts
        .into_iter()
        .map(|span| TextSpan {
            text: span.text,
            bbox: Rect::new(
                span.left,
                span.head.baseline - ASCENT * span.head.size,
                span.right,
                span.head.baseline + DESCENT * span.head.size,
            ),
            size: span.head.size,
            flags: span.head.flags,
        })
        .collect();
    let bbox = spans
        .iter()
        .map(|span| span.bbox)
        .reduce(|acc, bbox| acc.union(&bbox))?;
    let size = spans.iter().map(|span| span.size).fold(0.0, f32::max);
    Some(DraftLine {
        bbox,
        size,
        dir,
        spans,
    })
}

/// Distance from the text ending at `left..right` to `next`, along the
/// writing direction.
fn advance_gap(left: f32, right: f32, next: &Glyph) -> f32 {
    if next.is_reversed() {
        left - next.x1
    } else {
        next.x0 - right
    }
}

fn needs_space(text: &str, next: &Glyph, left: f32, right: f32) -> bool {
    advance_gap(left, right, next) > WORD_GAP * next.size
        && !text.ends_with(char::is_whitespace)
        && !next.text.starts_with(char::is_whitespace)
}
