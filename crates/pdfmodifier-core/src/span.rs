//! Text spans: one entry per show-text operator in a page's content.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::geometry::{BBox, Ctm};

/// An indirect object reference `(object number, generation)`.
pub type ObjectRef = (u32, u16);

/// Stable identifier of a span: page index plus its ordinal on that page.
///
/// The string form is `"<page>:<ordinal>"`, e.g. `"0:3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId {
    /// Page index (0-based).
    pub page: usize,
    /// Position of the span in the page's span list.
    pub index: usize,
}

impl SpanId {
    pub fn new(page: usize, index: usize) -> Self {
        Self { page, index }
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.index)
    }
}

/// Error returned when a string is not a valid `"<page>:<ordinal>"` span id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSpanIdError(String);

impl fmt::Display for ParseSpanIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid span id '{}': expected <page>:<ordinal>", self.0)
    }
}

impl std::error::Error for ParseSpanIdError {}

impl FromStr for SpanId {
    type Err = ParseSpanIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseSpanIdError(s.to_string());
        let (page, index) = s.trim().split_once(':').ok_or_else(invalid)?;
        let page = page.parse().map_err(|_| invalid())?;
        let index = index.parse().map_err(|_| invalid())?;
        Ok(SpanId { page, index })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SpanId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SpanId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A run of text produced by exactly one show-text operator (`Tj`, `TJ`,
/// `'` or `"`).
///
/// Spans are never merged, even when neighbouring operators share a font
/// and baseline, so each one maps back to a single byte range that can be
/// rewritten in isolation. A span is stale once its stream is modified.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextSpan {
    pub id: SpanId,
    /// Decoded Unicode text.
    pub text: String,
    /// Content stream that holds the operator.
    pub stream: ObjectRef,
    /// Bytes of the decoded stream occupied by the operator and its operands.
    pub byte_range: Range<usize>,
    /// Index of the operator in its stream's operator list.
    pub operator_index: usize,
    /// Resource name used by `Tf` (e.g. `F1`).
    pub font_name: String,
    /// The font's `/BaseFont`.
    pub base_font: String,
    pub font_size: f64,
    /// Character spacing (`Tc`) in effect.
    pub char_spacing: f64,
    /// Word spacing (`Tw`) in effect.
    pub word_spacing: f64,
    /// Horizontal scaling (`Tz`) as a factor, 1.0 = 100%.
    pub horizontal_scaling: f64,
    /// Text matrix at the start of the operator.
    pub text_matrix: Ctm,
    /// Current transformation matrix at the start of the operator.
    pub ctm: Ctm,
    /// Bounding box in page space, top-left origin.
    pub bbox: BBox,
    /// Horizontal advance in unscaled text space units.
    pub width: f64,
}

impl TextSpan {
    /// Page index (0-based).
    pub fn page(&self) -> usize {
        self.id.page
    }
}

/// Compact, serializable view of a span for callers that only need to
/// locate text.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpanDescription {
    pub page: usize,
    pub span_id: SpanId,
    pub text: String,
    pub bbox: BBox,
    /// The font's `/BaseFont`.
    pub font: String,
    pub font_size: f64,
}

impl From<&TextSpan> for SpanDescription {
    fn from(span: &TextSpan) -> Self {
        SpanDescription {
            page: span.page(),
            span_id: span.id,
            text: span.text.clone(),
            bbox: span.bbox,
            font: span.base_font.clone(),
            font_size: span.font_size,
        }
    }
}
