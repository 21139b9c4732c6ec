//! Text search over indexed spans.

use regex::Regex;

use crate::geometry::BBox;
use crate::span::{SpanId, TextSpan};

/// Options controlling text search behavior.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchOptions {
    /// Whether to interpret the pattern as a regex (default: `true`).
    /// When `false`, the pattern is treated as a literal string.
    pub regex: bool,
    /// Whether the search is case-sensitive (default: `true`).
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            regex: true,
            case_sensitive: true,
        }
    }
}

impl SearchOptions {
    /// Literal, case-sensitive matching.
    pub fn literal() -> Self {
        Self {
            regex: false,
            case_sensitive: true,
        }
    }

    /// Compile `pattern` according to these options.
    pub fn compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        let body = if self.regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        if self.case_sensitive {
            Regex::new(&body)
        } else {
            Regex::new(&format!("(?i){body}"))
        }
    }
}

/// A search hit inside one span.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchMatch {
    /// The matched text.
    pub text: String,
    pub span_id: SpanId,
    /// Page number (0-indexed).
    pub page: usize,
    /// Bounding box of the containing span.
    pub bbox: BBox,
    /// Byte offset of the match start within the span text.
    pub start: usize,
    /// Byte offset of the match end within the span text.
    pub end: usize,
}

/// Search every span for `pattern`.
///
/// Matches never cross span boundaries, since each span is an independent
/// rewrite target. Returns an empty vector for an empty or invalid pattern.
pub fn search_spans<'a>(
    spans: impl IntoIterator<Item = &'a TextSpan>,
    pattern: &str,
    options: &SearchOptions,
) -> Vec<SearchMatch> {
    if pattern.is_empty() {
        return Vec::new();
    }
    let Ok(re) = options.compile(pattern) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for span in spans {
        for m in re.find_iter(&span.text) {
            if m.as_str().is_empty() {
                continue;
            }
            results.push(SearchMatch {
                text: m.as_str().to_string(),
                span_id: span.id,
                page: span.page(),
                bbox: span.bbox,
                start: m.start(),
                end: m.end(),
            });
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Ctm;

    fn make_span(page: usize, index: usize, text: &str) -> TextSpan {
        TextSpan {
            id: SpanId::new(page, index),
            text: text.to_string(),
            stream: (4, 0),
            byte_range: 0..1,
            operator_index: index,
            font_name: "F1".to_string(),
            base_font: "Helvetica".to_string(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            text_matrix: Ctm::identity(),
            ctm: Ctm::identity(),
            bbox: BBox::new(0.0, 0.0, 10.0, 12.0),
            width: 10.0,
        }
    }

    #[test]
    fn search_options_defaults() {
        let opts = SearchOptions::default();
        assert!(opts.regex);
        assert!(opts.case_sensitive);
    }

    #[test]
    fn literal_search_escapes_metacharacters() {
        let spans = vec![make_span(0, 0, "Total (USD): 1.00"), make_span(0, 1, "1x00")];
        let hits = search_spans(&spans, "1.00", &SearchOptions::literal());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].span_id, SpanId::new(0, 0));
        assert_eq!(hits[0].start, 13);
        assert_eq!(hits[0].end, 17);
    }

    #[test]
    fn regex_search_across_pages() {
        let spans = vec![
            make_span(0, 0, "Invoice #100"),
            make_span(1, 0, "Invoice #205"),
            make_span(1, 1, "Thank you"),
        ];
        let hits = search_spans(&spans, r"#\d+", &SearchOptions::default());
        let texts: Vec<&str> = hits.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["#100", "#205"]);
        assert_eq!(hits[1].page, 1);
    }

    #[test]
    fn case_insensitive_search() {
        let spans = vec![make_span(0, 0, "HELLO hello")];
        let opts = SearchOptions {
            regex: false,
            case_sensitive: false,
        };
        assert_eq!(search_spans(&spans, "Hello", &opts).len(), 2);
        assert!(search_spans(&spans, "Hello", &SearchOptions::literal()).is_empty());
    }

    #[test]
    fn invalid_or_empty_pattern_returns_empty() {
        let spans = vec![make_span(0, 0, "abc")];
        assert!(search_spans(&spans, "(", &SearchOptions::default()).is_empty());
        assert!(search_spans(&spans, "", &SearchOptions::default()).is_empty());
    }
}
