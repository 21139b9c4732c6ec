//! pdfmodifier-core: Backend-independent data types for PDF text replacement.
//!
//! This crate provides the foundational types (BBox, Ctm, TextSpan, SpanId,
//! ReplacementSpec, ApplyReport) and the standard single-byte text encodings
//! used by pdfmodifier-rs. It has no PDF library dependency.

pub mod encoding;
pub mod error;
pub mod font;
pub mod geometry;
pub mod replacement;
pub mod report;
pub mod search;
pub mod span;

pub use encoding::{FontEncoding, StandardEncoding, glyph_name_to_char};
pub use error::{ErrorKind, PdfModifierError};
pub use font::{FontInfo, FontKind, is_subset_name};
pub use geometry::{BBox, Ctm};
pub use replacement::{
    MatchCriterion, MatchPolicy, ModifyOptions, ReplacementSpec, UnencodablePolicy,
};
pub use report::{
    AppliedEntry, ApplyReport, LayoutAdjustment, SkipReason, SkippedEntry, Substitution,
};
pub use search::{SearchMatch, SearchOptions, search_spans};
pub use span::{ObjectRef, ParseSpanIdError, SpanDescription, SpanId, TextSpan};
