//! Replacement engine: resolves [`ReplacementSpec`]s against a text index
//! and rewrites the affected show-text operators in place.

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

use pdfmodifier_core::{
    AppliedEntry, ApplyReport, LayoutAdjustment, MatchCriterion, MatchPolicy, ModifyOptions,
    ObjectRef, PdfModifierError, ReplacementSpec, SkipReason, SkippedEntry, SpanId, TextSpan,
};
use pdfmodifier_parse::tokenizer::{self, Operand, Operator, ShowKind};
use pdfmodifier_parse::{BackendError, Document, Font, ParseOptions, TextIndex, index, write};
use regex::Regex;
use tracing::{debug, info, warn};

/// Adjustments smaller than this (in thousandths of text space) are
/// dropped from the rebuilt operator.
const MIN_ADJUSTMENT: f64 = 0.001;

/// Apply a batch of replacements, returning the modified document.
///
/// Every spec is resolved against `index`, which must describe `doc` as
/// it is now. Per-spec failures are recorded in the report; only
/// structural problems (an unreadable stream, a span whose font is not
/// in the index) are returned as errors.
pub fn apply(
    mut doc: Document,
    index: &TextIndex,
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
) -> Result<(Document, ApplyReport), PdfModifierError> {
    let report = apply_in_place(&mut doc, index, specs, options)?;
    Ok((doc, report))
}

/// Resolve and encode a batch without touching the document.
pub fn plan(
    doc: &Document,
    index: &TextIndex,
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
) -> Result<ApplyReport, PdfModifierError> {
    let (_, report) = prepare(doc, index, specs, options)?;
    Ok(report)
}

fn apply_in_place(
    doc: &mut Document,
    index: &TextIndex,
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
) -> Result<ApplyReport, PdfModifierError> {
    let (streams, report) = prepare(doc, index, specs, options)?;
    for (id, rewrite) in streams {
        let compress = rewrite.was_compressed || options.compress_streams;
        let content = rewrite.into_content();
        doc.replace_stream_content(id, content, compress)?;
        debug!(object = id.0, compress, "rewrote content stream");
    }
    info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        spans = report.spans_touched,
        "applied replacement batch"
    );
    Ok(report)
}

/// A spec matched to one span, before encoding.
struct Target {
    spec_index: usize,
    span_id: SpanId,
    new_text: String,
    preserve_layout: bool,
}

/// Decoded content of one stream plus the splices to make in it.
struct StreamRewrite {
    content: Vec<u8>,
    operations: Vec<tokenizer::Operation>,
    was_compressed: bool,
    edits: Vec<(Range<usize>, Vec<u8>)>,
}

impl StreamRewrite {
    fn load(doc: &Document, id: ObjectRef) -> Result<Self, BackendError> {
        let content = doc.stream_content(id)?;
        let operations = tokenizer::decode(&content)?;
        Ok(Self {
            content,
            operations,
            was_compressed: doc.is_stream_compressed(id),
            edits: Vec::new(),
        })
    }

    /// Splice every edit into the content, last offset first so earlier
    /// ranges stay valid.
    fn into_content(mut self) -> Vec<u8> {
        self.edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        let mut content = self.content;
        for (range, bytes) in self.edits {
            content.splice(range, bytes);
        }
        content
    }
}

/// Resolve specs, encode replacements and collect the stream splices.
fn prepare(
    doc: &Document,
    index: &TextIndex,
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
) -> Result<(BTreeMap<ObjectRef, StreamRewrite>, ApplyReport), PdfModifierError> {
    let mut report = ApplyReport::default();
    let targets = resolve(index, specs, options, &mut report);

    let mut streams: BTreeMap<ObjectRef, StreamRewrite> = BTreeMap::new();
    // Operators already rewritten, by stream and start offset. Pages that
    // share a content stream or draw the same form yield several spans here.
    let mut locations: HashMap<(ObjectRef, usize), (usize, Vec<u8>)> = HashMap::new();
    for target in targets {
        let span = index.get(target.span_id).ok_or_else(|| {
            PdfModifierError::Index {
                page: target.span_id.page,
                message: format!("span {} vanished from the index", target.span_id),
            }
        })?;
        let font = index.font(span.id).ok_or_else(|| {
            PdfModifierError::Index {
                page: span.page(),
                message: format!("font /{} missing from the index", span.font_name),
            }
        })?;

        let encoded = match font.encode(&target.new_text, options.unencodable) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(spec = target.spec_index, span = %span.id, error = %e, "replacement not encodable");
                report.skipped.push(SkippedEntry {
                    spec_index: target.spec_index,
                    page: Some(span.page()),
                    span_id: Some(span.id),
                    reason: SkipReason::Encoding {
                        character: e.character,
                        font: e.font,
                    },
                });
                continue;
            }
        };

        if !streams.contains_key(&span.stream) {
            streams.insert(span.stream, StreamRewrite::load(doc, span.stream)?);
        }
        let Some(rewrite) = streams.get_mut(&span.stream) else {
            continue;
        };
        let original = rewrite
            .operations
            .get(span.operator_index)
            .filter(|op| op.byte_range == span.byte_range && op.operator.is_show_text())
            .ok_or_else(|| PdfModifierError::Index {
                page: span.page(),
                message: format!("span {} does not match its content stream", span.id),
            })?;

        let layout = target
            .preserve_layout
            .then(|| layout_adjustment(span, font, &encoded.bytes));
        let bytes = rebuild_operator(&original.operator, encoded.bytes.clone(), layout);

        let location = (span.stream, span.byte_range.start);
        match locations.get(&location) {
            Some((earlier_spec, earlier_bytes)) if *earlier_bytes != bytes => {
                let earlier_spec = *earlier_spec;
                warn!(
                    spec = target.spec_index,
                    span = %span.id,
                    earlier_spec,
                    "operator already rewritten with different text"
                );
                report.skipped.push(SkippedEntry {
                    spec_index: target.spec_index,
                    page: Some(span.page()),
                    span_id: Some(span.id),
                    reason: SkipReason::Conflict { earlier_spec },
                });
                continue;
            }
            Some(_) => {
                debug!(span = %span.id, object = span.stream.0, "operator shared with an earlier span");
            }
            None => {
                rewrite.edits.push((span.byte_range.clone(), bytes.clone()));
                locations.insert(location, (target.spec_index, bytes));
            }
        }

        report.applied.push(AppliedEntry {
            spec_index: target.spec_index,
            span_id: span.id,
            page: span.page(),
            original: span.text.clone(),
            replacement: font.decode(&encoded.bytes),
            layout,
            substitutions: encoded.substitutions,
        });
    }

    report.spans_touched = locations.len();
    report.skipped.sort_by_key(|entry| entry.spec_index);
    Ok((streams, report))
}

/// Match every spec against the index. Skips are recorded in `report`.
fn resolve(
    index: &TextIndex,
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
    report: &mut ApplyReport,
) -> Vec<Target> {
    let mut claimed: HashMap<SpanId, usize> = HashMap::new();
    let mut targets = Vec::new();

    for (spec_index, spec) in specs.iter().enumerate() {
        let skip = |reason: SkipReason, page: Option<usize>, span_id: Option<SpanId>| {
            warn!(spec = spec_index, %reason, "replacement skipped");
            SkippedEntry {
                spec_index,
                page,
                span_id,
                reason,
            }
        };

        if let Some(page) = spec.scope {
            if page >= index.page_count() {
                let page_count = index.page_count();
                report.skipped.push(skip(
                    SkipReason::PageOutOfRange { page, page_count },
                    Some(page),
                    None,
                ));
                continue;
            }
        }

        let matches = match find_matches(index, spec) {
            Ok(matches) => matches,
            Err(reason) => {
                report.skipped.push(skip(reason, spec.scope, None));
                continue;
            }
        };
        if matches.is_empty() {
            report.skipped.push(skip(SkipReason::NoMatch, spec.scope, None));
            continue;
        }

        let matches = match spec.effective_policy(options) {
            MatchPolicy::ReplaceAll => matches,
            MatchPolicy::ReplaceFirst => matches.into_iter().take(1).collect(),
            MatchPolicy::RequireUnique if matches.len() > 1 => {
                let count = matches.len();
                report.skipped.push(skip(
                    SkipReason::AmbiguousMatch { count },
                    spec.scope,
                    None,
                ));
                continue;
            }
            MatchPolicy::RequireUnique => matches,
        };

        for (span, new_text) in matches {
            if let Some(&earlier_spec) = claimed.get(&span.id) {
                report.skipped.push(skip(
                    SkipReason::Conflict { earlier_spec },
                    Some(span.page()),
                    Some(span.id),
                ));
                continue;
            }
            claimed.insert(span.id, spec_index);
            targets.push(Target {
                spec_index,
                span_id: span.id,
                new_text,
                preserve_layout: spec.preserve_layout,
            });
        }
    }
    targets
}

/// Spans a spec matches, in document order, with their new text.
fn find_matches<'a>(
    index: &'a TextIndex,
    spec: &ReplacementSpec,
) -> Result<Vec<(&'a TextSpan, String)>, SkipReason> {
    let in_scope = |span: &TextSpan| spec.scope.is_none_or(|page| span.page() == page);
    let candidates = index.spans().filter(|span| in_scope(span));

    match &spec.criterion {
        MatchCriterion::Exact(target) => Ok(candidates
            .filter(|span| span.text == *target)
            .map(|span| (span, spec.replacement.clone()))
            .collect()),
        MatchCriterion::Span { span_id } => match index.get(*span_id) {
            Some(span) if in_scope(span) => Ok(vec![(span, spec.replacement.clone())]),
            _ => Err(SkipReason::UnknownSpan),
        },
        MatchCriterion::Pattern { pattern } => {
            let re = Regex::new(pattern).map_err(|e| SkipReason::InvalidPattern {
                message: e.to_string(),
            })?;
            Ok(candidates
                .filter(|span| re.is_match(&span.text))
                .map(|span| {
                    let new_text = re.replace_all(&span.text, spec.replacement.as_str());
                    (span, new_text.into_owned())
                })
                .collect())
        }
    }
}

/// Width compensation that keeps the text matrix where the original
/// text left it.
fn layout_adjustment(span: &TextSpan, font: &Font, bytes: &[u8]) -> LayoutAdjustment {
    let new_width = font.string_width(
        bytes,
        span.font_size,
        span.char_spacing,
        span.word_spacing,
        span.horizontal_scaling,
    );
    let scale = span.font_size * span.horizontal_scaling;
    let adjustment = if scale == 0.0 {
        0.0
    } else {
        // TJ moves by -n/1000 * Tfs * Th
        let n = -(span.width - new_width) * 1000.0 / scale;
        (n * 1000.0).round() / 1000.0
    };
    LayoutAdjustment {
        original_width: span.width,
        new_width,
        adjustment,
    }
}

/// Serialize the operator(s) that replace a show-text operator.
///
/// The original string form (literal or hex) is kept. With a layout
/// adjustment the text is shown through `TJ`, preceded by the line move
/// and spacing changes `'` and `"` imply.
fn rebuild_operator(original: &Operator, bytes: Vec<u8>, layout: Option<LayoutAdjustment>) -> Vec<u8> {
    let (kind, operands) = match original {
        Operator::ShowText { kind, operands } => (*kind, operands.as_slice()),
        other => return tokenizer::encode_operator(other),
    };
    let string = if uses_hex(operands) {
        Operand::HexString(bytes)
    } else {
        Operand::LiteralString(bytes)
    };

    let adjustment = layout
        .map(|l| l.adjustment)
        .filter(|n| n.abs() >= MIN_ADJUSTMENT);
    let mut ops = Vec::new();
    match (kind, adjustment) {
        (ShowKind::Tj, None) => ops.push(Operator::new("Tj", vec![string])),
        (ShowKind::Quote, None) => ops.push(Operator::new("'", vec![string])),
        (ShowKind::DoubleQuote, None) => {
            let mut kept: Vec<Operand> = operands.iter().take(2).cloned().collect();
            kept.push(string);
            ops.push(Operator::new("\"", kept));
        }
        (ShowKind::TJ, _) | (_, Some(_)) => {
            match kind {
                ShowKind::Quote => ops.push(Operator::new("T*", Vec::new())),
                ShowKind::DoubleQuote => {
                    if let [aw, ac, ..] = operands {
                        ops.push(Operator::new("Tw", vec![aw.clone()]));
                        ops.push(Operator::new("Tc", vec![ac.clone()]));
                    }
                    ops.push(Operator::new("T*", Vec::new()));
                }
                ShowKind::Tj | ShowKind::TJ => {}
            }
            let mut items = vec![string];
            if let Some(n) = adjustment {
                items.push(Operand::Real(n));
            }
            ops.push(Operator::new("TJ", vec![Operand::Array(items)]));
        }
    }
    tokenizer::encode(&ops)
}

/// Whether the first string operand (or `TJ` element) is a hex string.
fn uses_hex(operands: &[Operand]) -> bool {
    for operand in operands {
        match operand {
            Operand::HexString(_) => return true,
            Operand::LiteralString(_) => return false,
            Operand::Array(items) => return uses_hex(items),
            _ => {}
        }
    }
    false
}

/// An editing session over one document.
///
/// Batches may be applied repeatedly; the text index is rebuilt after any
/// batch that changed the document.
///
/// # Example
///
/// ```ignore
/// let mut modifier = PdfModifier::open(&bytes)?;
/// let report = modifier.apply(&[ReplacementSpec::exact("Invoice #100", "Invoice #101")])?;
/// let output = modifier.to_bytes()?;
/// ```
#[derive(Debug, Clone)]
pub struct PdfModifier {
    doc: Document,
    index: TextIndex,
    options: ModifyOptions,
}

impl PdfModifier {
    /// Parse and index a document.
    pub fn open(bytes: &[u8]) -> Result<Self, PdfModifierError> {
        Self::open_with_options(bytes, &ParseOptions::default())
    }

    /// Parse and index a document with explicit parse limits.
    pub fn open_with_options(
        bytes: &[u8],
        parse_options: &ParseOptions,
    ) -> Result<Self, PdfModifierError> {
        let doc = Document::parse_with_options(bytes, parse_options)?;
        Self::from_document(doc)
    }

    /// Index an already-parsed document.
    pub fn from_document(doc: Document) -> Result<Self, PdfModifierError> {
        let index = index(&doc)?;
        Ok(Self {
            doc,
            index,
            options: ModifyOptions::default(),
        })
    }

    /// Replace the batch options.
    pub fn with_options(mut self, options: ModifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ModifyOptions {
        &self.options
    }

    /// The index of the document in its current state.
    pub fn index(&self) -> &TextIndex {
        &self.index
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Apply a batch and re-index if anything changed.
    pub fn apply(&mut self, specs: &[ReplacementSpec]) -> Result<ApplyReport, PdfModifierError> {
        let report = apply_in_place(&mut self.doc, &self.index, specs, &self.options)?;
        if !report.is_noop() {
            self.index = index(&self.doc)?;
        }
        Ok(report)
    }

    /// Report what [`apply`](Self::apply) would do, without changing anything.
    pub fn plan(&self, specs: &[ReplacementSpec]) -> Result<ApplyReport, PdfModifierError> {
        plan(&self.doc, &self.index, specs, &self.options)
    }

    /// Serialize the current document.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PdfModifierError> {
        Ok(write(&self.doc)?)
    }

    pub fn into_document(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(s: &[u8]) -> Operand {
        Operand::LiteralString(s.to_vec())
    }

    fn show(kind: &str, operands: Vec<Operand>) -> Operator {
        Operator::new(kind, operands)
    }

    fn adjustment(n: f64) -> Option<LayoutAdjustment> {
        Some(LayoutAdjustment {
            original_width: 0.0,
            new_width: 0.0,
            adjustment: n,
        })
    }

    #[test]
    fn rebuild_tj_keeps_literal_form() {
        let op = show("Tj", vec![literal(b"old")]);
        assert_eq!(rebuild_operator(&op, b"new (1)".to_vec(), None), b"(new \\(1\\)) Tj");
    }

    #[test]
    fn rebuild_tj_keeps_hex_form() {
        let op = show("Tj", vec![Operand::HexString(b"old".to_vec())]);
        assert_eq!(rebuild_operator(&op, b"AB".to_vec(), None), b"<4142> Tj");
    }

    #[test]
    fn rebuild_tj_array_drops_old_kerning() {
        let op = show(
            "TJ",
            vec![Operand::Array(vec![
                Operand::HexString(b"A".to_vec()),
                Operand::Integer(-120),
                Operand::HexString(b"B".to_vec()),
            ])],
        );
        assert_eq!(rebuild_operator(&op, b"C".to_vec(), None), b"[<43>] TJ");
    }

    #[test]
    fn rebuild_with_layout_uses_tj() {
        let op = show("Tj", vec![literal(b"#100")]);
        assert_eq!(
            rebuild_operator(&op, b"#1".to_vec(), adjustment(-1112.0)),
            b"[(#1) -1112.0] TJ"
        );
        // negligible adjustments keep the original operator
        assert_eq!(rebuild_operator(&op, b"#1".to_vec(), adjustment(0.0)), b"(#1) Tj");
    }

    #[test]
    fn rebuild_quotes() {
        let quote = show("'", vec![literal(b"x")]);
        assert_eq!(rebuild_operator(&quote, b"y".to_vec(), None), b"(y) '");
        assert_eq!(
            rebuild_operator(&quote, b"y".to_vec(), adjustment(250.0)),
            b"T*\n[(y) 250.0] TJ"
        );

        let double = show(
            "\"",
            vec![Operand::Integer(1), Operand::Real(0.5), literal(b"x")],
        );
        assert_eq!(rebuild_operator(&double, b"y".to_vec(), None), b"1 0.5 (y) \"");
        assert_eq!(
            rebuild_operator(&double, b"y".to_vec(), adjustment(-10.5)),
            b"1 Tw\n0.5 Tc\nT*\n[(y) -10.5] TJ"
        );
    }

    #[test]
    fn hex_detection_looks_at_first_string() {
        assert!(uses_hex(&[Operand::Integer(1), Operand::HexString(vec![])]));
        assert!(!uses_hex(&[Operand::Array(vec![
            Operand::Integer(5),
            literal(b"a"),
        ])]));
        assert!(!uses_hex(&[]));
    }
}
