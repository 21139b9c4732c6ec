//! pdfmodifier-parse: PDF document model, content stream tokenizer, text
//! indexer and serializer.
//!
//! This crate is the lopdf-backed layer of pdfmodifier-rs. It parses the
//! object graph ([`Document`]), splits content streams into operators
//! ([`tokenizer`]), resolves fonts and encodings ([`Font`]), replays text
//! state to locate every show-text operator ([`index`]) and writes the
//! result back out ([`write`]). It depends on pdfmodifier-core for shared
//! data types.

pub mod cmap;
pub mod document;
pub mod error;
pub mod font;
pub mod indexer;
pub mod serializer;
pub mod standard_fonts;
pub mod text_state;
pub mod tokenizer;

#[cfg(test)]
mod testing;

pub use cmap::CMap;
pub use document::{Document, Page, ParseOptions, display_name};
pub use error::BackendError;
pub use font::{EncodedText, Font, Unencodable, load_font, load_fonts};
pub use indexer::{TextIndex, index};
pub use pdfmodifier_core;
pub use serializer::write;
pub use text_state::{GraphicsStack, TextParams, TextState};
pub use tokenizer::{Operand, Operation, Operator, PositionKind, ShowKind, decode, encode};
