//! Outcome of applying a batch of replacement specs.

use std::fmt;

use crate::span::SpanId;

/// Width compensation added to keep trailing content in place.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutAdjustment {
    /// Advance of the original text in unscaled text space units.
    pub original_width: f64,
    /// Advance of the replacement text before compensation.
    pub new_width: f64,
    /// `TJ` adjustment appended after the text, in thousandths of text space.
    pub adjustment: f64,
}

/// A character that was replaced because the font could not encode it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Substitution {
    pub original: char,
    pub substitute: char,
}

/// One span rewritten by one spec.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEntry {
    /// Position of the spec in the submitted batch.
    pub spec_index: usize,
    pub span_id: SpanId,
    pub page: usize,
    /// Text of the span before the edit.
    pub original: String,
    /// Text of the span after the edit.
    pub replacement: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layout: Option<LayoutAdjustment>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub substitutions: Vec<Substitution>,
}

/// Why a spec (or one of its matches) was not applied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum SkipReason {
    /// No span matched.
    NoMatch,
    /// The replacement contains a character the font cannot encode.
    Encoding { character: char, font: String },
    /// `RequireUnique` was in effect and several spans matched.
    AmbiguousMatch { count: usize },
    /// The pattern is not a valid regular expression.
    InvalidPattern { message: String },
    /// The span id names no span in the index.
    UnknownSpan,
    /// The scope names a page the document does not have.
    PageOutOfRange { page: usize, page_count: usize },
    /// An earlier spec already rewrites this span.
    Conflict { earlier_spec: usize },
}

impl SkipReason {
    /// Returns the string tag for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoMatch => "NO_MATCH",
            SkipReason::Encoding { .. } => "ENCODING",
            SkipReason::AmbiguousMatch { .. } => "AMBIGUOUS_MATCH",
            SkipReason::InvalidPattern { .. } => "INVALID_PATTERN",
            SkipReason::UnknownSpan => "UNKNOWN_SPAN",
            SkipReason::PageOutOfRange { .. } => "PAGE_OUT_OF_RANGE",
            SkipReason::Conflict { .. } => "CONFLICT",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoMatch => write!(f, "no span matched"),
            SkipReason::Encoding { character, font } => {
                write!(f, "character {character:?} cannot be encoded in font {font}")
            }
            SkipReason::AmbiguousMatch { count } => {
                write!(f, "{count} spans matched but a unique match was required")
            }
            SkipReason::InvalidPattern { message } => write!(f, "invalid pattern: {message}"),
            SkipReason::UnknownSpan => write!(f, "span id does not exist"),
            SkipReason::PageOutOfRange { page, page_count } => {
                write!(f, "page {page} out of range (document has {page_count})")
            }
            SkipReason::Conflict { earlier_spec } => {
                write!(f, "span already rewritten by spec {earlier_spec}")
            }
        }
    }
}

/// A spec, or one of its matched spans, that was not applied.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedEntry {
    pub spec_index: usize,
    /// Page involved, when the failure is tied to one.
    pub page: Option<usize>,
    /// Span involved, when the failure is tied to one.
    pub span_id: Option<SpanId>,
    pub reason: SkipReason,
}

/// Result of a replacement batch.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyReport {
    pub applied: Vec<AppliedEntry>,
    pub skipped: Vec<SkippedEntry>,
    /// Number of distinct show-text operators rewritten. Spans that share
    /// one operator (a content stream or form drawn more than once) count once.
    pub spans_touched: usize,
}

impl ApplyReport {
    /// `true` when the batch changed nothing.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }

    /// Applied entries produced by one spec.
    pub fn applied_for(&self, spec_index: usize) -> impl Iterator<Item = &AppliedEntry> {
        self.applied
            .iter()
            .filter(move |entry| entry.spec_index == spec_index)
    }

    /// Skipped entries produced by one spec.
    pub fn skipped_for(&self, spec_index: usize) -> impl Iterator<Item = &SkippedEntry> {
        self.skipped
            .iter()
            .filter(move |entry| entry.spec_index == spec_index)
    }

    /// Every substitution made across the batch.
    pub fn substitutions(&self) -> impl Iterator<Item = &Substitution> {
        self.applied.iter().flat_map(|entry| entry.substitutions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(spec_index: usize, index: usize) -> AppliedEntry {
        AppliedEntry {
            spec_index,
            span_id: SpanId::new(0, index),
            page: 0,
            original: "a".to_string(),
            replacement: "b".to_string(),
            layout: None,
            substitutions: vec![],
        }
    }

    #[test]
    fn default_report_is_noop() {
        let report = ApplyReport::default();
        assert!(report.is_noop());
        assert_eq!(report.spans_touched, 0);
    }

    #[test]
    fn entries_filter_by_spec() {
        let report = ApplyReport {
            applied: vec![applied(0, 0), applied(1, 1), applied(0, 2)],
            skipped: vec![SkippedEntry {
                spec_index: 2,
                page: None,
                span_id: None,
                reason: SkipReason::NoMatch,
            }],
            spans_touched: 3,
        };
        assert_eq!(report.applied_for(0).count(), 2);
        assert_eq!(report.applied_for(2).count(), 0);
        assert_eq!(report.skipped_for(2).count(), 1);
        assert!(!report.is_noop());
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::Encoding {
            character: '€',
            font: "ABCDEF+Foo".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "character '€' cannot be encoded in font ABCDEF+Foo"
        );
        assert_eq!(reason.as_str(), "ENCODING");
        assert_eq!(
            SkipReason::PageOutOfRange {
                page: 4,
                page_count: 2
            }
            .to_string(),
            "page 4 out of range (document has 2)"
        );
    }

    #[test]
    fn substitutions_flatten_across_entries() {
        let mut entry = applied(0, 0);
        entry.substitutions.push(Substitution {
            original: 'Ж',
            substitute: '?',
        });
        let report = ApplyReport {
            applied: vec![entry, applied(1, 1)],
            skipped: vec![],
            spans_touched: 2,
        };
        assert_eq!(report.substitutions().count(), 1);
    }
}
