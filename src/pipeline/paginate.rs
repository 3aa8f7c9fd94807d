//! Line-based pagination of translated text onto fixed-size pages.
//!
//! Pure and deterministic: the same text and layout always give the same
//! [`OutputDocument`]. Lines are never truncated or dropped; a line wider
//! than the page is left to clip at the right edge.

use crate::config::PageLayout;
use serde::Serialize;

/// A line of text at its baseline position on the page, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

/// One output page, lines in top-to-bottom order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: usize,
    pub lines: Vec<PlacedLine>,
}

impl RenderedPage {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }
}

/// The paginated document. Sealed: only [`paginate`] constructs one and its
/// pages cannot be modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDocument {
    layout: PageLayout,
    pages: Vec<RenderedPage>,
}

impl OutputDocument {
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total lines placed across all pages.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }
}

/// Lay `text` out line by line.
///
/// Each page starts its cursor at `layout.top_y()`. A line goes on the
/// current page while the cursor is strictly above `layout.bottom_margin`;
/// a cursor at or below the margin starts a new page. A fresh page always
/// accepts its first line. Empty text gives one empty page.
pub fn paginate(text: &str, layout: &PageLayout) -> OutputDocument {
    let mut pages = Vec::new();
    let mut current: Vec<PlacedLine> = Vec::new();

    for line in split_lines(text) {
        let mut y = layout.line_y(current.len());
        if y <= layout.bottom_margin && !current.is_empty() {
            pages.push(seal(pages.len(), std::mem::take(&mut current)));
            y = layout.line_y(0);
        }
        current.push(PlacedLine {
            text: line.to_string(),
            x: layout.left_margin,
            y,
        });
    }
    pages.push(seal(pages.len(), current));

    OutputDocument {
        layout: *layout,
        pages,
    }
}

fn seal(index: usize, lines: Vec<PlacedLine>) -> RenderedPage {
    RenderedPage {
        number: index + 1,
        lines,
    }
}

/// `\n`-delimited segments, empty ones included. A trailing `\r` on each
/// segment is dropped. Empty text has no lines.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let lines = if text.is_empty() {
        None
    } else {
        Some(text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l)))
    };
    lines.into_iter().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exactly two lines per page: y = 100, 90 fit; 80 hits the margin.
    fn two_line_layout() -> PageLayout {
        PageLayout {
            width: 200.0,
            height: 110.0,
            left_margin: 10.0,
            top_margin: 10.0,
            bottom_margin: 80.0,
            line_height: 10.0,
            ..PageLayout::letter()
        }
    }

    #[test]
    fn three_lines_two_per_page() {
        let doc = paginate("A\nB\nC", &two_line_layout());
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages()[0].texts(), vec!["A", "B"]);
        assert_eq!(doc.pages()[1].texts(), vec!["C"]);
        assert_eq!(doc.pages()[1].lines[0].y, 100.0);
        assert_eq!(doc.pages()[1].number, 2);
    }

    #[test]
    fn empty_text_gives_one_empty_page() {
        let doc = paginate("", &PageLayout::letter());
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn empty_lines_are_placed() {
        let doc = paginate("a\n\n\nb\n", &PageLayout::letter());
        assert_eq!(doc.line_count(), 5);
        assert_eq!(doc.pages()[0].texts(), vec!["a", "", "", "b", ""]);
    }

    #[test]
    fn line_on_the_margin_breaks_the_page() {
        // Third cursor lands exactly on the bottom margin.
        let on_margin = two_line_layout();
        assert_eq!(on_margin.line_y(2), on_margin.bottom_margin);
        assert_eq!(paginate("1\n2\n3", &on_margin).page_count(), 2);

        // Margin one point lower: the third line fits.
        let below = PageLayout {
            bottom_margin: 79.0,
            ..two_line_layout()
        };
        assert_eq!(paginate("1\n2\n3", &below).page_count(), 1);

        // Margin one point higher: only two lines fit.
        let above = PageLayout {
            bottom_margin: 81.0,
            ..two_line_layout()
        };
        assert_eq!(paginate("1\n2\n3", &above).page_count(), 2);
    }

    #[test]
    fn letter_page_holds_fifty_lines() {
        let text = (1..=101).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let doc = paginate(&text, &PageLayout::letter());
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.pages()[0].lines.len(), 50);
        assert_eq!(doc.pages()[1].lines.len(), 50);
        assert_eq!(doc.pages()[2].texts(), vec!["101"]);
        let first = &doc.pages()[0].lines[0];
        assert_eq!((first.x, first.y), (10.0, 750.0));
        assert_eq!(doc.pages()[0].lines[49].y, 64.0);
    }

    #[test]
    fn long_lines_are_not_truncated() {
        let long = "x".repeat(5000);
        let doc = paginate(&long, &PageLayout::a4());
        assert_eq!(doc.pages()[0].lines[0].text.len(), 5000);
    }

    #[test]
    fn crlf_is_stripped() {
        let doc = paginate("a\r\nb", &PageLayout::letter());
        assert_eq!(doc.pages()[0].texts(), vec!["a", "b"]);
    }

    #[test]
    fn deterministic() {
        let text = "uno\ndos\n\ntres";
        assert_eq!(
            paginate(text, &PageLayout::a4()),
            paginate(text, &PageLayout::a4())
        );
    }
}
