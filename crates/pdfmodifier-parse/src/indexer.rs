//! Text indexer: replays each page's content streams and records one
//! [`TextSpan`] per show-text operator.
//!
//! Form XObjects drawn with `Do` are replayed in place. Their spans point
//! at the form's own stream, so the replacement engine rewrites the form.

use std::collections::HashMap;

use lopdf::{Dictionary, Object};
use pdfmodifier_core::{
    BBox, Ctm, ObjectRef, SearchMatch, SearchOptions, SpanId, TextSpan, search_spans,
};
use tracing::{debug, warn};

use crate::document::{Document, Page, display_name, object_to_f64};
use crate::error::BackendError;
use crate::font::{Font, load_font};
use crate::text_state::{GraphicsStack, TextState};
use crate::tokenizer::{self, Operand, Operator, PositionKind, ShowKind};

/// Baselines closer than this are treated as the same line by
/// [`TextIndex::page_text`].
const SAME_LINE_TOLERANCE: f64 = 1.0;

/// Deepest chain of nested Form XObjects replayed before giving up.
const MAX_FORM_DEPTH: usize = 10;

/// Spans of every page, in content stream order, plus the fonts they use.
#[derive(Debug, Clone, Default)]
pub struct TextIndex {
    pages: Vec<Vec<TextSpan>>,
    fonts: Vec<PageFonts>,
}

/// Fonts resolved on one page and the slot each span was shown with.
#[derive(Debug, Clone, Default)]
struct PageFonts {
    table: Vec<Font>,
    by_span: Vec<usize>,
}

impl TextIndex {
    /// All spans, page by page.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.pages.iter().flatten()
    }

    /// Spans of one page; empty for an unknown page.
    pub fn page(&self, index: usize) -> &[TextSpan] {
        self.pages.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn get(&self, id: SpanId) -> Option<&TextSpan> {
        self.pages.get(id.page)?.get(id.index)
    }

    /// Total number of spans.
    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The font a span was shown with.
    ///
    /// Resource names are only unique within one resource dictionary, so
    /// fonts are looked up by span rather than by name.
    pub fn font(&self, id: SpanId) -> Option<&Font> {
        let fonts = self.fonts.get(id.page)?;
        fonts.table.get(*fonts.by_span.get(id.index)?)
    }

    /// Text of a page in stream order. Spans on the same baseline are
    /// concatenated; a baseline change starts a new line.
    pub fn page_text(&self, page: usize) -> String {
        let mut out = String::new();
        let mut last_baseline: Option<f64> = None;
        for span in self.page(page) {
            let baseline = span.text_matrix.concat(&span.ctm).f;
            if let Some(prev) = last_baseline {
                if (prev - baseline).abs() > SAME_LINE_TOLERANCE {
                    out.push('\n');
                }
            }
            out.push_str(&span.text);
            last_baseline = Some(baseline);
        }
        out
    }

    /// Search all spans. Matches never cross span boundaries.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchMatch> {
        search_spans(self.spans(), query, options)
    }
}

/// Index every page of a document.
///
/// Text inside Form XObjects is indexed where the form is drawn, once per
/// `Do`. Image XObjects and unknown XObject names are skipped.
///
/// # Errors
///
/// [`BackendError::Index`] when a `Tf` names a font missing from the
/// resources in scope, text is shown before any `Tf`, or forms nest deeper
/// than ten levels; tokenizer and stream errors propagate unchanged.
pub fn index(doc: &Document) -> Result<TextIndex, BackendError> {
    let mut text_index = TextIndex::default();
    for page in doc.pages() {
        let (spans, fonts) = index_page(doc, page)?;
        text_index.pages.push(spans);
        text_index.fonts.push(fonts);
    }
    debug!(pages = text_index.page_count(), spans = text_index.len(), "indexed document");
    Ok(text_index)
}

/// Replay one page. All content streams share a single state.
fn index_page(doc: &Document, page: &Page) -> Result<(Vec<TextSpan>, PageFonts), BackendError> {
    let mut replay = PageReplay {
        doc,
        page,
        scope: ResourceScope {
            owner: page.id,
            resources: doc.page_resources(page)?,
        },
        fonts: PageFonts::default(),
        font_slots: HashMap::new(),
        text: TextState::new(),
        graphics: GraphicsStack::new(),
        q_floor: 0,
        form_depth: 0,
        spans: Vec::new(),
    };
    for &stream in &page.contents {
        replay.replay_stream(stream)?;
    }
    if replay.graphics.depth() > 0 {
        debug!(page = page.index, depth = replay.graphics.depth(), "unbalanced q at end of page");
    }
    Ok((replay.spans, replay.fonts))
}

/// A resource dictionary and the object that owns it (a page or a form).
#[derive(Debug, Clone)]
struct ResourceScope {
    owner: ObjectRef,
    resources: Dictionary,
}

struct PageReplay<'a> {
    doc: &'a Document,
    page: &'a Page,
    scope: ResourceScope,
    fonts: PageFonts,
    /// Font slots by resource owner and raw resource name.
    font_slots: HashMap<(ObjectRef, Vec<u8>), usize>,
    text: TextState,
    graphics: GraphicsStack,
    /// `Q` never pops below this depth; a form cannot restore its caller's state.
    q_floor: usize,
    form_depth: usize,
    spans: Vec<TextSpan>,
}

impl PageReplay<'_> {
    fn replay_stream(&mut self, stream: ObjectRef) -> Result<(), BackendError> {
        let content = self.doc.stream_content(stream)?;
        let operations = tokenizer::decode(&content)?;
        debug!(
            page = self.page.index,
            object = stream.0,
            operators = operations.len(),
            form_depth = self.form_depth,
            "replaying content stream"
        );
        for (operator_index, operation) in operations.iter().enumerate() {
            self.apply(
                &operation.operator,
                stream,
                operation.byte_range.clone(),
                operator_index,
            )?;
        }
        Ok(())
    }

    fn apply(
        &mut self,
        operator: &Operator,
        stream: ObjectRef,
        byte_range: std::ops::Range<usize>,
        operator_index: usize,
    ) -> Result<(), BackendError> {
        match operator {
            Operator::SetFont { operands } => {
                let (Some(name), Some(size)) = (
                    operands.first().and_then(Operand::as_name),
                    operands.get(1).and_then(Operand::as_f64),
                ) else {
                    return Ok(());
                };
                let slot = self.resolve_font(name)?;
                self.text.set_font(slot, size);
            }
            Operator::SetPosition { kind, operands } => {
                let n = numbers(operands);
                match (kind, n.as_slice()) {
                    (PositionKind::Td, [tx, ty]) => self.text.move_text_position(*tx, *ty),
                    (PositionKind::TD, [tx, ty]) => {
                        self.text.move_text_position_and_set_leading(*tx, *ty)
                    }
                    (PositionKind::Tm, [a, b, c, d, e, f]) => {
                        self.text.set_text_matrix(Ctm::new(*a, *b, *c, *d, *e, *f))
                    }
                    (PositionKind::TStar, _) => self.text.next_line(),
                    (PositionKind::Cm, [a, b, c, d, e, f]) => {
                        self.graphics.concat(&Ctm::new(*a, *b, *c, *d, *e, *f))
                    }
                    _ => {}
                }
            }
            Operator::ShowText { kind, operands } => {
                self.show_text(*kind, operands, stream, byte_range, operator_index)?;
            }
            Operator::Other { name, operands } => {
                let value = operands.first().and_then(Operand::as_f64);
                match (name.as_str(), value) {
                    ("BT", _) => self.text.begin_text(),
                    ("ET", _) => self.text.end_text(),
                    ("q", _) => self.graphics.save(&self.text.params),
                    ("Q", _) if self.graphics.depth() > self.q_floor => {
                        if let Some(saved) = self.graphics.restore() {
                            self.text.params = saved;
                        }
                    }
                    ("Q", _) => warn!(page = self.page.index, "unbalanced Q ignored"),
                    ("Do", _) => {
                        if let Some(name) = operands.first().and_then(Operand::as_name) {
                            self.draw_xobject(name)?;
                        }
                    }
                    ("Tc", Some(v)) => self.text.params.char_spacing = v,
                    ("Tw", Some(v)) => self.text.params.word_spacing = v,
                    ("Tz", Some(v)) => self.text.set_horizontal_scaling_percent(v),
                    ("TL", Some(v)) => self.text.params.leading = v,
                    ("Ts", Some(v)) => self.text.params.rise = v,
                    ("Tr", Some(v)) => self.text.params.render_mode = v as i64,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Resolve a `Tf` name in the resources in scope, returning its slot.
    fn resolve_font(&mut self, name: &[u8]) -> Result<usize, BackendError> {
        let key = (self.scope.owner, name.to_vec());
        if let Some(&slot) = self.font_slots.get(&key) {
            return Ok(slot);
        }
        match load_font(self.doc, &self.scope.resources, name)? {
            Some(font) => {
                let slot = self.fonts.table.len();
                self.fonts.table.push(font);
                self.font_slots.insert(key, slot);
                Ok(slot)
            }
            None => {
                let place = if self.form_depth == 0 { "page" } else { "form" };
                Err(BackendError::index(
                    self.page.index,
                    format!("font /{} not found in {place} resources", display_name(name)),
                ))
            }
        }
    }

    /// `Do`: replay a Form XObject in place. Other XObjects draw no text.
    fn draw_xobject(&mut self, name: &[u8]) -> Result<(), BackendError> {
        let doc = self.doc;
        let entry = self
            .scope
            .resources
            .get(b"XObject")
            .ok()
            .map(|obj| doc.resolve(obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok());
        let Some(Object::Reference(id)) = entry else {
            warn!(
                page = self.page.index,
                name = %display_name(name),
                "XObject not found, Do ignored"
            );
            return Ok(());
        };
        let id: ObjectRef = *id;
        let Ok(stream) = doc.object(id)?.as_stream() else {
            return Ok(());
        };
        let subtype = stream.dict.get(b"Subtype").and_then(Object::as_name).ok();
        if subtype != Some(&b"Form"[..]) {
            return Ok(());
        }
        if self.form_depth >= MAX_FORM_DEPTH {
            return Err(BackendError::index(
                self.page.index,
                format!("Form XObject nesting exceeds {MAX_FORM_DEPTH} levels"),
            ));
        }

        let matrix = form_matrix(&stream.dict);
        let scope = match stream.dict.get(b"Resources").map(|obj| doc.resolve(obj)) {
            Ok(Object::Dictionary(resources)) => ResourceScope {
                owner: id,
                resources: resources.clone(),
            },
            _ => self.scope.clone(),
        };

        // Forms run inside an implicit q/Q
        let outer_floor = self.q_floor;
        self.graphics.save(&self.text.params);
        self.q_floor = self.graphics.depth();
        self.graphics.concat(&matrix);
        let outer_scope = std::mem::replace(&mut self.scope, scope);
        self.form_depth += 1;

        let result = self.replay_stream(id);

        self.form_depth -= 1;
        self.scope = outer_scope;
        while self.graphics.depth() > self.q_floor {
            self.graphics.restore();
        }
        self.q_floor = outer_floor;
        if let Some(saved) = self.graphics.restore() {
            self.text.params = saved;
        }
        result
    }

    fn show_text(
        &mut self,
        kind: ShowKind,
        operands: &[Operand],
        stream: ObjectRef,
        byte_range: std::ops::Range<usize>,
        operator_index: usize,
    ) -> Result<(), BackendError> {
        let text_operand = match kind {
            ShowKind::Tj | ShowKind::TJ => operands.first(),
            ShowKind::Quote => {
                self.text.next_line();
                operands.first()
            }
            ShowKind::DoubleQuote => {
                let n = numbers(&operands[..operands.len().min(2)]);
                if let [aw, ac] = n.as_slice() {
                    self.text.params.word_spacing = *aw;
                    self.text.params.char_spacing = *ac;
                }
                self.text.next_line();
                operands.get(2)
            }
        };

        let slot = self.text.params.font.ok_or_else(|| {
            BackendError::index(self.page.index, format!("{} before any Tf", kind.keyword()))
        })?;
        let font = self.fonts.table.get(slot).ok_or_else(|| {
            BackendError::index(self.page.index, format!("font slot {slot} not resolved"))
        })?;
        let params = &self.text.params;
        let (fs, tc, tw, th) = (
            params.font_size,
            params.char_spacing,
            params.word_spacing,
            params.horizontal_scaling,
        );

        // TJ arrays interleave strings with kerning adjustments
        let items: Vec<&Operand> = match text_operand {
            Some(Operand::Array(items)) => items.iter().collect(),
            Some(operand) => vec![operand],
            None => Vec::new(),
        };
        let mut text = String::new();
        let mut width = 0.0;
        for item in items {
            if let Some(bytes) = item.as_string_bytes() {
                text.push_str(&font.decode(bytes));
                width += font.string_width(bytes, fs, tc, tw, th);
            } else if let Some(adjust) = item.as_f64() {
                width -= adjust / 1000.0 * fs * th;
            }
        }

        let text_matrix = self.text.text_matrix();
        let ctm = self.graphics.ctm();
        let bbox = span_bbox(self.page, text_matrix.concat(&ctm), width, font, params.rise, fs);
        let span = TextSpan {
            id: SpanId::new(self.page.index, self.spans.len()),
            text,
            stream,
            byte_range,
            operator_index,
            font_name: font.resource_name().to_string(),
            base_font: font.base_font().to_string(),
            font_size: fs,
            char_spacing: tc,
            word_spacing: tw,
            horizontal_scaling: th,
            text_matrix,
            ctm,
            bbox,
            width,
        };
        self.text.advance(width);
        self.spans.push(span);
        self.fonts.by_span.push(slot);
        Ok(())
    }
}

fn numbers(operands: &[Operand]) -> Vec<f64> {
    operands.iter().filter_map(Operand::as_f64).collect()
}

/// A form's `/Matrix`, identity when absent or malformed.
fn form_matrix(dict: &Dictionary) -> Ctm {
    let values: Option<Vec<f64>> = dict
        .get(b"Matrix")
        .and_then(Object::as_array)
        .ok()
        .and_then(|arr| arr.iter().map(object_to_f64).collect());
    match values.as_deref() {
        Some(&[a, b, c, d, e, f]) => Ctm::new(a, b, c, d, e, f),
        _ => Ctm::identity(),
    }
}

/// Page-space box (top-left origin) of a run `width` text-space units
/// long, from the font's descent to its ascent.
fn span_bbox(page: &Page, m: Ctm, width: f64, font: &Font, rise: f64, font_size: f64) -> BBox {
    let (ascent, descent) = font.vertical_metrics();
    let y0 = rise + descent / 1000.0 * font_size;
    let y1 = rise + ascent / 1000.0 * font_size;
    let corners: Vec<(f64, f64)> = [(0.0, y0), (width, y0), (0.0, y1), (width, y1)]
        .iter()
        .map(|&(x, y)| {
            let (px, py) = m.transform_point(x, y);
            (px - page.media_box.x0, page.media_box.bottom - py)
        })
        .collect();
    BBox::from_points(&corners).unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0))
}

#[cfg(test)]
mod tests {
    use lopdf::{Object, Stream, dictionary};

    use super::*;
    use crate::testing::{
        add_xobject, build_pdf_doc, build_pdf_doc_with_fonts, form_xobject, helvetica,
        root_resources_mut,
    };

    fn index_of(pages: &[&[u8]]) -> TextIndex {
        let doc = Document::from_lopdf(build_pdf_doc(pages)).unwrap();
        index(&doc).unwrap()
    }

    fn assert_approx(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
    }

    #[test]
    fn single_tj_span() {
        let idx = index_of(&[b"BT /F1 12 Tf 72 720 Td (Invoice #100) Tj ET"]);
        assert_eq!(idx.len(), 1);
        let span = &idx.page(0)[0];
        assert_eq!(span.id, SpanId::new(0, 0));
        assert_eq!(span.text, "Invoice #100");
        assert_eq!(span.font_name, "F1");
        assert_eq!(span.base_font, "Helvetica");
        assert_eq!(span.font_size, 12.0);
        assert_eq!(span.operator_index, 3);
        assert_eq!(span.text_matrix.to_array(), [1.0, 0.0, 0.0, 1.0, 72.0, 720.0]);
        assert_eq!(span.byte_range, 23..40);
        assert_eq!(idx.get(SpanId::new(0, 0)), Some(span));
        assert_eq!(idx.get(SpanId::new(0, 1)), None);
    }

    #[test]
    fn span_width_and_bbox() {
        let idx = index_of(&[b"BT /F1 10 Tf 100 700 Td (ab) Tj ET"]);
        let span = &idx.page(0)[0];
        // a = 556, b = 556 at 10pt
        assert_approx(span.width, 11.12);
        assert_approx(span.bbox.x0, 100.0);
        assert_approx(span.bbox.x1, 111.12);
        // ascent 718, descent -207 on a 792pt page
        assert_approx(span.bbox.top, 792.0 - 707.18);
        assert_approx(span.bbox.bottom, 792.0 - 697.93);
    }

    #[test]
    fn one_span_per_operator() {
        let idx = index_of(&[b"BT /F1 12 Tf 72 720 Td (A) Tj (B) Tj (C) Tj ET"]);
        let texts: Vec<&str> = idx.page(0).iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["A", "B", "C"]);
        // each Tj advances the text matrix
        let xs: Vec<f64> = idx.page(0).iter().map(|s| s.text_matrix.e).collect();
        assert_approx(xs[1] - xs[0], 667.0 / 1000.0 * 12.0);
        assert_approx(xs[2] - xs[1], 667.0 / 1000.0 * 12.0);
    }

    #[test]
    fn tj_array_concatenates_and_kerns() {
        let idx = index_of(&[b"BT /F1 10 Tf [(A) -500 (B)] TJ ET"]);
        let span = &idx.page(0)[0];
        assert_eq!(span.text, "AB");
        assert_approx(span.width, 6.67 + 5.0 + 6.67);
    }

    #[test]
    fn quote_operators_move_to_next_line() {
        let idx = index_of(&[b"BT /F1 10 Tf 14 TL 72 700 Td (one) Tj (two) ' 1 2 (three) \" ET"]);
        let spans = idx.page(0);
        assert_eq!(spans.len(), 3);
        assert_approx(spans[1].text_matrix.f, 686.0);
        assert_approx(spans[1].text_matrix.e, 72.0);
        assert_approx(spans[2].text_matrix.f, 672.0);
        assert_eq!(spans[2].word_spacing, 1.0);
        assert_eq!(spans[2].char_spacing, 2.0);
        assert_eq!(idx.page_text(0), "one\ntwo\nthree");
    }

    #[test]
    fn q_restores_text_params_and_ctm() {
        let idx = index_of(&[
            b"q 2 0 0 2 0 0 cm BT /F1 10 Tf 3 Tc (A) Tj ET Q BT /F1 10 Tf (B) Tj ET",
        ]);
        let spans = idx.page(0);
        assert_eq!(spans[0].ctm.a, 2.0);
        assert_eq!(spans[0].char_spacing, 3.0);
        assert_eq!(spans[1].ctm, Ctm::identity());
        assert_eq!(spans[1].char_spacing, 0.0);
    }

    #[test]
    fn unbalanced_q_is_tolerated() {
        let idx = index_of(&[b"Q BT /F1 10 Tf (A) Tj ET"]);
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn font_persists_across_streams_of_a_page() {
        let mut doc = build_pdf_doc(&[b"BT /F1 10 Tf 72 700 Td"]);
        let second = doc.add_object(Stream::new(dictionary! {}, b"(Tail) Tj ET".to_vec()));
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_object_mut(page_id).unwrap().as_dict_mut().unwrap();
        let first = page.get(b"Contents").unwrap().clone();
        page.set("Contents", Object::Array(vec![first, Object::Reference(second)]));

        let doc = Document::from_lopdf(doc).unwrap();
        let idx = index(&doc).unwrap();
        let span = &idx.page(0)[0];
        assert_eq!(span.text, "Tail");
        assert_eq!(span.stream, second);
        assert_eq!(span.byte_range, 0..9);
        assert_eq!(span.text_matrix.e, 72.0);
    }

    #[test]
    fn spans_numbered_per_page() {
        let idx = index_of(&[b"BT /F1 10 Tf (a) Tj ET", b"BT /F1 10 Tf (b) Tj (c) Tj ET"]);
        assert_eq!(idx.page_count(), 2);
        assert_eq!(idx.page(1)[1].id, SpanId::new(1, 1));
        assert_eq!(idx.page(1)[1].text, "c");
        assert!(idx.page(5).is_empty());
        assert_eq!(idx.spans().count(), 3);
    }

    #[test]
    fn missing_font_is_index_error() {
        let doc = Document::from_lopdf(build_pdf_doc(&[b"BT /F9 10 Tf (x) Tj ET"])).unwrap();
        let err = index(&doc).unwrap_err();
        assert!(matches!(err, BackendError::Index { page: 0, .. }));
        assert!(err.to_string().contains("/F9"));
    }

    #[test]
    fn text_before_tf_is_index_error() {
        let doc = Document::from_lopdf(build_pdf_doc(&[b"BT (x) Tj ET"])).unwrap();
        let err = index(&doc).unwrap_err();
        assert!(matches!(err, BackendError::Index { page: 0, .. }));
    }

    #[test]
    fn search_and_fonts() {
        let lopdf_doc = build_pdf_doc_with_fonts(
            &[b"BT /F1 10 Tf (Total 1.00) Tj /F2 10 Tf (Net 2.50) Tj ET"],
            vec![("F1", helvetica()), ("F2", helvetica())],
        );
        let doc = Document::from_lopdf(lopdf_doc).unwrap();
        let idx = index(&doc).unwrap();
        let hits = idx.search(r"\d\.\d\d", &SearchOptions::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].span_id, SpanId::new(0, 1));
        assert_eq!(hits[1].text, "2.50");
        assert_eq!(idx.font(SpanId::new(0, 1)).unwrap().resource_name(), "F2");
        assert!(idx.font(SpanId::new(0, 2)).is_none());
        assert_eq!(idx.page_text(0), "Total 1.00Net 2.50");
    }

    #[test]
    fn non_utf8_font_name_resolves() {
        let mut lopdf_doc = build_pdf_doc_with_fonts(&[b"BT /F#E9 10 Tf (cafe) Tj ET"], vec![]);
        let font_id = lopdf_doc.add_object(helvetica());
        root_resources_mut(&mut lopdf_doc)
            .get_mut(b"Font")
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set(b"F\xE9".to_vec(), font_id);

        let idx = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap();
        let span = &idx.page(0)[0];
        assert_eq!(span.text, "cafe");
        assert_eq!(span.font_name, "F#E9");
        assert_eq!(idx.font(span.id).unwrap().base_font(), "Helvetica");
    }

    // ---- Form XObjects ----

    fn courier() -> lopdf::Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        }
    }

    #[test]
    fn form_text_is_indexed_with_its_own_stream_and_fonts() {
        let mut lopdf_doc =
            build_pdf_doc(&[b"q 1 0 0 1 100 200 cm /Fm1 Do Q BT /F1 10 Tf (Page) Tj ET"]);
        let form = form_xobject(
            b"BT /F1 12 Tf 5 5 Td (Inside) Tj ET",
            dictionary! {
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 0.into()],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => Object::Dictionary(courier()) },
                },
            },
        );
        let form_id = add_xobject(&mut lopdf_doc, "Fm1", form);

        let idx = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap();
        let spans = idx.page(0);
        assert_eq!(spans.len(), 2);

        let inside = &spans[0];
        assert_eq!(inside.text, "Inside");
        assert_eq!(inside.stream, form_id);
        assert_eq!(inside.byte_range, 20..31);
        assert_eq!(inside.operator_index, 3);
        assert_eq!(inside.ctm.to_array(), [1.0, 0.0, 0.0, 1.0, 110.0, 200.0]);
        assert_eq!(inside.base_font, "Courier");
        assert_eq!(idx.font(inside.id).unwrap().base_font(), "Courier");

        // same resource name, page scope
        let page_span = &spans[1];
        assert_eq!(page_span.ctm, Ctm::identity());
        assert_eq!(page_span.font_name, "F1");
        assert_eq!(idx.font(page_span.id).unwrap().base_font(), "Helvetica");
    }

    #[test]
    fn form_without_resources_uses_the_callers() {
        let mut lopdf_doc = build_pdf_doc(&[b"/Fm1 Do /Fm1 Do"]);
        let form_id = add_xobject(
            &mut lopdf_doc,
            "Fm1",
            form_xobject(b"BT /F1 10 Tf (Stamp) Tj ET", dictionary! {}),
        );

        let idx = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap();
        let spans = idx.page(0);
        // one span per Do, both at the same operator
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|s| s.text == "Stamp" && s.stream == form_id));
        assert_eq!(spans[0].byte_range, spans[1].byte_range);
        assert_eq!(spans[1].id, SpanId::new(0, 1));
    }

    #[test]
    fn form_cannot_restore_the_callers_state() {
        let mut lopdf_doc =
            build_pdf_doc(&[b"q 2 0 0 2 0 0 cm /Fm1 Do BT /F1 10 Tf (After) Tj ET Q"]);
        add_xobject(
            &mut lopdf_doc,
            "Fm1",
            form_xobject(b"Q Q 3 Tc q 5 0 0 5 0 0 cm", dictionary! {}),
        );

        let idx = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap();
        let after = &idx.page(0)[0];
        assert_eq!(after.ctm.a, 2.0);
        assert_eq!(after.char_spacing, 0.0);
    }

    #[test]
    fn images_and_unknown_xobjects_are_skipped() {
        let mut lopdf_doc = build_pdf_doc(&[b"/Im1 Do /Missing Do BT /F1 10 Tf (x) Tj ET"]);
        add_xobject(
            &mut lopdf_doc,
            "Im1",
            Stream::new(
                dictionary! { "Type" => "XObject", "Subtype" => "Image", "Width" => 1, "Height" => 1 },
                vec![0],
            ),
        );
        let idx = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap();
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn self_drawing_form_is_index_error() {
        let mut lopdf_doc = build_pdf_doc(&[b"/Fm1 Do"]);
        add_xobject(&mut lopdf_doc, "Fm1", form_xobject(b"/Fm1 Do", dictionary! {}));
        let err = index(&Document::from_lopdf(lopdf_doc).unwrap()).unwrap_err();
        assert!(matches!(err, BackendError::Index { page: 0, .. }));
        assert!(err.to_string().contains("nesting"));
    }
}
