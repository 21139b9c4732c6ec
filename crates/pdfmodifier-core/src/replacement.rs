//! Replacement instructions and the options that govern how they apply.

use crate::span::SpanId;

/// What a [`ReplacementSpec`] targets.
///
/// Serialized untagged: a bare string is an exact match, `{"span_id": "0:3"}`
/// names one span and `{"pattern": "..."}` is a regular expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum MatchCriterion {
    /// Spans whose decoded text equals this string (case-sensitive).
    Exact(String),
    /// One specific span.
    Span { span_id: SpanId },
    /// Spans whose text matches this regular expression. The replacement
    /// may reference capture groups (`$1`, `${name}`).
    Pattern { pattern: String },
}

/// How many of several matching spans a spec rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MatchPolicy {
    /// Rewrite every matching span.
    #[default]
    ReplaceAll,
    /// Rewrite only the first match in document order.
    ReplaceFirst,
    /// Apply only if exactly one span matches; otherwise skip the spec.
    RequireUnique,
}

/// What to do with replacement characters the target font cannot encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum UnencodablePolicy {
    /// Skip the replacement and report an encoding failure.
    #[default]
    Fail,
    /// Use this character instead. Fails if it is unencodable too.
    Substitute(char),
}

/// One replacement instruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplacementSpec {
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub criterion: MatchCriterion,
    pub replacement: String,
    /// Restrict matching to this page (0-based). `None` searches all pages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scope: Option<usize>,
    /// Compensate width changes with a `TJ` adjustment so trailing content
    /// on the line keeps its position.
    #[cfg_attr(feature = "serde", serde(default))]
    pub preserve_layout: bool,
    /// Overrides [`ModifyOptions::match_policy`] for this spec.
    #[cfg_attr(feature = "serde", serde(default))]
    pub policy: Option<MatchPolicy>,
}

impl ReplacementSpec {
    fn with_criterion(criterion: MatchCriterion, replacement: impl Into<String>) -> Self {
        Self {
            criterion,
            replacement: replacement.into(),
            scope: None,
            preserve_layout: false,
            policy: None,
        }
    }

    /// Replace spans whose text equals `target`.
    pub fn exact(target: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::with_criterion(MatchCriterion::Exact(target.into()), replacement)
    }

    /// Replace the text of a single span.
    pub fn span(span_id: SpanId, replacement: impl Into<String>) -> Self {
        Self::with_criterion(MatchCriterion::Span { span_id }, replacement)
    }

    /// Rewrite spans matching a regular expression.
    pub fn pattern(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::with_criterion(
            MatchCriterion::Pattern {
                pattern: pattern.into(),
            },
            replacement,
        )
    }

    /// Restrict matching to one page.
    pub fn on_page(mut self, page: usize) -> Self {
        self.scope = Some(page);
        self
    }

    pub fn preserve_layout(mut self, preserve: bool) -> Self {
        self.preserve_layout = preserve;
        self
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// The policy in effect for this spec under the given options.
    pub fn effective_policy(&self, options: &ModifyOptions) -> MatchPolicy {
        self.policy.unwrap_or(options.match_policy)
    }
}

/// Options for a batch of replacements.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ModifyOptions {
    /// Default multiple-match policy (default: [`MatchPolicy::ReplaceAll`]).
    pub match_policy: MatchPolicy,
    /// Handling of unencodable characters (default: [`UnencodablePolicy::Fail`]).
    pub unencodable: UnencodablePolicy,
    /// Flate-compress every rewritten stream, even ones stored uncompressed
    /// (default: `false`). Streams that were compressed stay compressed.
    pub compress_streams: bool,
}

impl ModifyOptions {
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_unencodable(mut self, policy: UnencodablePolicy) -> Self {
        self.unencodable = policy;
        self
    }

    pub fn with_compress_streams(mut self, compress: bool) -> Self {
        self.compress_streams = compress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_fields() {
        let spec = ReplacementSpec::exact("Invoice #100", "Invoice #101")
            .on_page(2)
            .preserve_layout(true)
            .with_policy(MatchPolicy::RequireUnique);
        assert_eq!(
            spec.criterion,
            MatchCriterion::Exact("Invoice #100".to_string())
        );
        assert_eq!(spec.replacement, "Invoice #101");
        assert_eq!(spec.scope, Some(2));
        assert!(spec.preserve_layout);
        assert_eq!(spec.policy, Some(MatchPolicy::RequireUnique));
    }

    #[test]
    fn effective_policy_prefers_spec_override() {
        let options = ModifyOptions::default().with_match_policy(MatchPolicy::ReplaceFirst);
        let plain = ReplacementSpec::exact("a", "b");
        assert_eq!(plain.effective_policy(&options), MatchPolicy::ReplaceFirst);
        let overridden = plain.with_policy(MatchPolicy::ReplaceAll);
        assert_eq!(overridden.effective_policy(&options), MatchPolicy::ReplaceAll);
    }

    #[test]
    fn default_options() {
        let options = ModifyOptions::default();
        assert_eq!(options.match_policy, MatchPolicy::ReplaceAll);
        assert_eq!(options.unencodable, UnencodablePolicy::Fail);
        assert!(!options.compress_streams);
    }

    #[test]
    fn span_and_pattern_constructors() {
        let spec = ReplacementSpec::span(SpanId::new(0, 3), "x");
        assert_eq!(
            spec.criterion,
            MatchCriterion::Span {
                span_id: SpanId::new(0, 3)
            }
        );
        let spec = ReplacementSpec::pattern(r"#(\d+)", "No. $1");
        assert!(matches!(spec.criterion, MatchCriterion::Pattern { .. }));
    }
}
