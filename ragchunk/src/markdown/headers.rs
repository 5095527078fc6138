//! Font-size based heading detection.
//!
//! The size carrying the most characters is taken to be body text; every
//! strictly larger size becomes a heading level, largest first.

use std::collections::{BTreeMap, HashMap};

use crate::layout::TextSpan;

/// Rounded font size → accumulated character count.
///
/// Keys iterate in ascending order, which makes the body-size tie-break
/// (smallest size wins) stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontSizeHistogram {
    counts: BTreeMap<u32, usize>,
}

impl FontSizeHistogram {
    pub fn from_spans<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Self {
        let mut histogram = Self::default();
        for span in spans {
            histogram.add(span);
        }
        histogram
    }

    /// Counts a span's trimmed characters; whitespace-only spans are ignored.
    pub fn add(&mut self, span: &TextSpan) {
        let trimmed = span.text.trim();
        if trimmed.is_empty() {
            return;
        }
        *self.counts.entry(span.rounded_size()).or_default() += trimmed.chars().count();
    }

    pub fn count(&self, size: u32) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    /// The most frequent size; ties resolve to the smallest size.
    pub fn body_size(&self) -> Option<u32> {
        let mut best: Option<(u32, usize)> = None;
        for (&size, &count) in &self.counts {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((size, count));
            }
        }
        best.map(|(size, _)| size)
    }
}

/// Font size → heading depth (1 for `#`, 2 for `##`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSizeMap {
    depths: HashMap<u32, usize>,
}

impl HeaderSizeMap {
    pub fn from_histogram(histogram: &FontSizeHistogram) -> Self {
        match histogram.body_size() {
            Some(body) => Self::with_body_limit(histogram, body),
            None => Self::default(),
        }
    }

    /// Treats every size strictly above `body_limit` as a heading.
    pub fn with_body_limit(histogram: &FontSizeHistogram, body_limit: u32) -> Self {
        let depths = histogram
            .counts
            .keys()
            .rev()
            .filter(|size| **size > body_limit)
            .enumerate()
            .map(|(idx, size)| (*size, idx + 1))
            .collect();
        Self { depths }
    }

    pub fn from_spans<'a>(spans: impl IntoIterator<Item = &'a TextSpan>) -> Self {
        Self::from_histogram(&FontSizeHistogram::from_spans(spans))
    }

    /// Heading depth for a rounded size; 0 means body text.
    pub fn depth(&self, size: u32) -> usize {
        self.depths.get(&size).copied().unwrap_or(0)
    }

    /// Markdown heading prefix for a span, e.g. `"## "`, or `""` for body text.
    pub fn prefix(&self, span: &TextSpan) -> String {
        match self.depth(span.rounded_size()) {
            0 => String::new(),
            depth => format!("{} ", "#".repeat(depth)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}
