//! Per-page Markdown reconstruction from PDF layout.

use crate::layout::{Block, LinkOverlay, PageLayout, TextSpan};

use super::headers::HeaderSizeMap;

/// Lines whose bottoms are this close are rendered as one output line.
const SAME_LINE_TOLERANCE: f32 = 3.0;
pub const DEFAULT_LINK_COVERAGE: f32 = 0.7;
const FENCE_OPEN: &str = "```";
const FENCE_CLOSE: &str = "```\n";
const BULLETS: [char; 4] = ['\u{F0B7}', '\u{B7}', '\u{2022}', '\u{25CF}'];

/// Whether the renderer is inside a fenced code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeMode {
    #[default]
    Prose,
    Code,
}

impl CodeMode {
    /// Advances on one line. Returns the next mode and the fence to emit, if any.
    pub fn transition(self, all_monospace: bool) -> (CodeMode, Option<&'static str>) {
        match (self, all_monospace) {
            (CodeMode::Prose, true) => (CodeMode::Code, Some(FENCE_OPEN)),
            (CodeMode::Code, false) => (CodeMode::Prose, Some(FENCE_CLOSE)),
            (mode, _) => (mode, None),
        }
    }

    /// Fence that must close an open code block at the end of a block.
    pub fn finish(self) -> Option<&'static str> {
        match self {
            CodeMode::Code => Some(FENCE_CLOSE),
            CodeMode::Prose => None,
        }
    }
}

pub struct PageRenderer<'a> {
    headers: &'a HeaderSizeMap,
    links: &'a [LinkOverlay],
    link_coverage: f32,
}

impl<'a> PageRenderer<'a> {
    pub fn new(headers: &'a HeaderSizeMap, links: &'a [LinkOverlay]) -> Self {
        Self {
            headers,
            links,
            link_coverage: DEFAULT_LINK_COVERAGE,
        }
    }

    pub fn with_link_coverage(mut self, coverage: f32) -> Self {
        self.link_coverage = coverage;
        self
    }

    pub fn render(&self, layout: &PageLayout) -> String {
        let mut out = String::new();
        for block in &layout.blocks {
            self.render_block(layout, block, &mut out);
            out.push('\n');
        }
        out.replace(" \n", "\n")
    }

    fn render_block(&self, layout: &PageLayout, block: &Block, out: &mut String) {
        let mut mode = CodeMode::Prose;
        let mut previous_y: Option<f32> = None;

        for line in layout.block_lines(block) {
            if !line.is_horizontal() {
                continue;
            }
            let spans = layout.line_spans(line);
            let Some(first) = spans.first() else {
                continue;
            };

            let this_y = line.bbox.bottom;
            let same_line =
                previous_y.is_some_and(|prev| (this_y - prev).abs() <= SAME_LINE_TOLERANCE);
            if same_line && out.ends_with('\n') {
                out.pop();
            }
            if !same_line {
                previous_y = Some(this_y);
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
            }

            let all_monospace = spans.iter().all(|span| span.flags.monospace);
            let (next, fence) = mode.transition(all_monospace);
            mode = next;
            if let Some(fence) = fence {
                out.push_str(fence);
            }

            if all_monospace {
                let text: String = spans.iter().map(|span| span.text.as_str()).collect();
                if !same_line {
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&" ".repeat(code_indent(first, block)));
                }
                out.push_str(&text);
                out.push(' ');
                continue;
            }

            // The line's first span decides the heading, even when it is blank.
            let mut heading = self.headers.prefix(first);
            for span in spans {
                let rendered = self.render_span(span, &heading);
                if !rendered.is_empty() {
                    heading.clear();
                }
                out.push_str(&rendered);
            }
            previous_y = Some(this_y);
            out.push('\n');
        }

        if let Some(fence) = mode.finish() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(fence);
        }
    }

    fn render_span(&self, span: &TextSpan, heading: &str) -> String {
        let text = span.text.trim();
        if text.is_empty() {
            return String::new();
        }
        if span.flags.monospace {
            return format!("`{text}` ");
        }

        let mut prefix = String::new();
        let mut suffix = String::new();
        if heading.is_empty() {
            if span.flags.bold {
                prefix.push_str("**");
                suffix.push_str("**");
            }
            if span.flags.italic {
                prefix.push('_');
                suffix.insert(0, '_');
            }
        }

        let body = match self.link_for(span) {
            Some(link) => format!("[{text}]({})", link.uri),
            None => escape_text(text),
        };
        format!("{heading}{prefix}{body}{suffix} ")
    }

    /// First link whose hot zone covers enough of the span's area.
    fn link_for(&self, span: &TextSpan) -> Option<&'a LinkOverlay> {
        let area = span.bbox.area();
        if area <= 0.0 {
            return None;
        }
        self.links.iter().find(|link| {
            link.hot_zone
                .intersection(&span.bbox)
                .is_some_and(|overlap| overlap.area() >= self.link_coverage * area)
        })
    }
}

/// Renders one page with the default link coverage.
pub fn render_page(layout: &PageLayout, links: &[LinkOverlay], headers: &HeaderSizeMap) -> String {
    PageRenderer::new(headers, links).render(layout)
}

/// Indentation in spaces, assuming glyphs half a font size wide.
fn code_indent(span: &TextSpan, block: &Block) -> usize {
    let glyph_width = span.size * 0.5;
    if glyph_width <= 0.0 {
        return 0;
    }
    ((span.bbox.left - block.bbox.left) / glyph_width)
        .round()
        .max(0.0) as usize
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ch if BULLETS.contains(&ch) => out.push('-'),
            ch => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Rect, StyleFlags};

    const HORIZONTAL: (f32, f32) = (1.0, 0.0);

    fn span(text: &str, left: f32, bottom: f32, size: f32, flags: StyleFlags) -> TextSpan {
        TextSpan {
            text: text.to_string(),
            bbox: Rect::new(left, bottom - size, left + 6.0 * text.len() as f32, bottom),
            size,
            flags,
        }
    }

    fn mono() -> StyleFlags {
        StyleFlags {
            monospace: true,
            ..StyleFlags::PLAIN
        }
    }

    fn layout(lines: Vec<Vec<TextSpan>>) -> PageLayout {
        let mut layout = PageLayout::default();
        layout.push_block(lines.into_iter().map(|spans| (spans, HORIZONTAL)).collect());
        layout
    }

    #[test]
    fn code_mode_transitions() {
        assert_eq!(
            CodeMode::Prose.transition(true),
            (CodeMode::Code, Some(FENCE_OPEN))
        );
        assert_eq!(CodeMode::Code.transition(true), (CodeMode::Code, None));
        assert_eq!(
            CodeMode::Code.transition(false),
            (CodeMode::Prose, Some(FENCE_CLOSE))
        );
        assert_eq!(CodeMode::Prose.transition(false), (CodeMode::Prose, None));
        assert_eq!(CodeMode::Prose.finish(), None);
        assert_eq!(CodeMode::Code.finish(), Some(FENCE_CLOSE));
    }

    #[test]
    fn all_monospace_lines_are_fenced_with_indentation() {
        let page = layout(vec![
            vec![span("fn main() {", 10.0, 20.0, 10.0, mono())],
            vec![span("run();", 30.0, 32.0, 10.0, mono())],
            vec![span("}", 10.0, 44.0, 10.0, mono())],
        ]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "```\nfn main() {\n    run();\n}\n```\n\n");
    }

    #[test]
    fn mixed_line_renders_inline_code_without_fence() {
        let page = layout(vec![vec![
            span("call", 10.0, 20.0, 10.0, StyleFlags::PLAIN),
            span("foo()", 40.0, 20.0, 10.0, mono()),
            span("now", 80.0, 20.0, 10.0, StyleFlags::PLAIN),
        ]]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert!(!md.contains("```"));
        assert_eq!(md, "call `foo()` now\n\n");
    }

    #[test]
    fn heading_prefix_comes_from_first_span_and_suppresses_emphasis() {
        let bold = StyleFlags {
            bold: true,
            ..StyleFlags::PLAIN
        };
        let title = span("Title", 10.0, 30.0, 20.0, bold);
        let body = span("body text body text", 10.0, 50.0, 10.0, StyleFlags::PLAIN);
        let headers = HeaderSizeMap::from_spans([&title, &body]);
        let page = layout(vec![vec![title], vec![body]]);
        let md = render_page(&page, &[], &headers);
        assert_eq!(md, "# Title\nbody text body text\n\n");
    }

    #[test]
    fn blank_leading_span_still_carries_the_heading() {
        let blank = span(" ", 10.0, 30.0, 20.0, StyleFlags::PLAIN);
        let title = span("Title", 16.0, 30.0, 20.0, StyleFlags::PLAIN);
        let body = span("body text body text", 10.0, 50.0, 10.0, StyleFlags::PLAIN);
        let headers = HeaderSizeMap::from_spans([&title, &body]);
        let page = layout(vec![vec![blank, title], vec![body]]);
        let md = render_page(&page, &[], &headers);
        assert_eq!(md, "# Title\nbody text body text\n\n");
    }

    #[test]
    fn bold_italic_wrapping() {
        let style = StyleFlags {
            bold: true,
            italic: true,
            monospace: false,
        };
        let page = layout(vec![vec![span("loud", 10.0, 20.0, 10.0, style)]]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "**_loud_**\n\n");
    }

    #[test]
    fn link_requires_seventy_percent_coverage() {
        let linked = span("docs", 0.0, 10.0, 10.0, StyleFlags::PLAIN);
        // Span box is 24 x 10; cover 80% then 50% of it.
        let wide = LinkOverlay {
            uri: "https://example.com".into(),
            hot_zone: Rect::new(0.0, 0.0, 19.2, 10.0),
        };
        let half = LinkOverlay {
            uri: "https://example.com".into(),
            hot_zone: Rect::new(0.0, 0.0, 12.0, 10.0),
        };
        let page = layout(vec![vec![linked]]);
        let headers = HeaderSizeMap::default();

        let md = render_page(&page, std::slice::from_ref(&wide), &headers);
        assert_eq!(md, "[docs](https://example.com)\n\n");

        let md = render_page(&page, std::slice::from_ref(&half), &headers);
        assert_eq!(md, "docs\n\n");
    }

    #[test]
    fn bullets_and_angle_brackets_are_normalized() {
        let page = layout(vec![vec![span(
            "\u{2022} a <b>",
            10.0,
            20.0,
            10.0,
            StyleFlags::PLAIN,
        )]]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "- a &lt;b&gt;\n\n");
    }

    #[test]
    fn nearby_lines_are_joined() {
        let page = layout(vec![
            vec![span("first", 10.0, 20.0, 10.0, StyleFlags::PLAIN)],
            vec![span("part", 60.0, 22.0, 10.0, StyleFlags::PLAIN)],
        ]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "first part\n\n");
    }

    #[test]
    fn vertical_lines_are_skipped() {
        let mut page = PageLayout::default();
        page.push_block(vec![
            (
                vec![span("sideways", 10.0, 20.0, 10.0, StyleFlags::PLAIN)],
                (0.0, -1.0),
            ),
            (
                vec![span("upright", 10.0, 40.0, 10.0, StyleFlags::PLAIN)],
                HORIZONTAL,
            ),
        ]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "upright\n\n");
    }

    #[test]
    fn upside_down_lines_are_rendered() {
        let mut page = PageLayout::default();
        page.push_block(vec![(
            vec![span("flipped", 10.0, 20.0, 10.0, StyleFlags::PLAIN)],
            (-1.0, 0.0),
        )]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "flipped\n\n");
    }

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let mut page = PageLayout::default();
        page.push_block(vec![(
            vec![span("one", 10.0, 20.0, 10.0, StyleFlags::PLAIN)],
            HORIZONTAL,
        )]);
        page.push_block(vec![(
            vec![span("two", 10.0, 80.0, 10.0, StyleFlags::PLAIN)],
            HORIZONTAL,
        )]);
        let md = render_page(&page, &[], &HeaderSizeMap::default());
        assert_eq!(md, "one\n\ntwo\n\n");
    }
}
