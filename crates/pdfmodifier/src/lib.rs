//! pdfmodifier: locate and rewrite text inside existing PDF documents.
//!
//! This is the public API facade crate for pdfmodifier-rs. It re-exports
//! types from pdfmodifier-core and uses pdfmodifier-parse for reading,
//! indexing and writing documents.
//!
//! # Architecture
//!
//! - **pdfmodifier-core**: Backend-independent data types (spans, specs, reports)
//! - **pdfmodifier-parse**: Document model, tokenizer, text indexer, serializer
//! - **pdfmodifier** (this crate): [`PdfAnalyzer`], [`PdfModifier`] and the
//!   replacement engine
//!
//! # Example
//!
//! ```ignore
//! use pdfmodifier::{ReplacementSpec, modify};
//!
//! let specs = [ReplacementSpec::exact("Invoice #100", "Invoice #101")];
//! let (output, report) = modify(&bytes, &specs)?;
//! assert_eq!(report.applied.len(), 1);
//! ```

mod analyzer;
pub mod modifier;

pub use analyzer::PdfAnalyzer;
pub use modifier::PdfModifier;
pub use pdfmodifier_core;
pub use pdfmodifier_core::{
    AppliedEntry, ApplyReport, BBox, Ctm, ErrorKind, FontInfo, FontKind, LayoutAdjustment,
    MatchCriterion, MatchPolicy, ModifyOptions, PdfModifierError, ReplacementSpec, SearchMatch,
    SearchOptions, SkipReason, SkippedEntry, SpanDescription, SpanId, StandardEncoding,
    Substitution, TextSpan, UnencodablePolicy,
};
pub use pdfmodifier_parse;
pub use pdfmodifier_parse::{Document, ParseOptions, TextIndex};

/// Index a document and describe every text span: page, span id, text,
/// bounding box, font and size.
pub fn analyze(bytes: &[u8]) -> Result<Vec<SpanDescription>, PdfModifierError> {
    Ok(PdfAnalyzer::open(bytes)?.describe())
}

/// Apply replacements with default options and serialize the result.
pub fn modify(
    bytes: &[u8],
    specs: &[ReplacementSpec],
) -> Result<(Vec<u8>, ApplyReport), PdfModifierError> {
    modify_with_options(bytes, specs, &ModifyOptions::default())
}

/// Apply replacements and serialize the result.
///
/// Structural problems fail the whole call; per-spec problems are listed
/// in [`ApplyReport::skipped`].
pub fn modify_with_options(
    bytes: &[u8],
    specs: &[ReplacementSpec],
    options: &ModifyOptions,
) -> Result<(Vec<u8>, ApplyReport), PdfModifierError> {
    let mut modifier = PdfModifier::open(bytes)?.with_options(options.clone());
    let report = modifier.apply(specs)?;
    let output = modifier.to_bytes()?;
    Ok((output, report))
}
