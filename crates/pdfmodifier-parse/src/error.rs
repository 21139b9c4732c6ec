//! Error types for the document, tokenizer, indexer and serializer layers.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps backend-specific errors and converts them to [`PdfModifierError`].

use pdfmodifier_core::PdfModifierError;
use thiserror::Error;

/// Error type for PDF backend operations.
///
/// Wraps backend-specific errors and provides conversion to
/// [`PdfModifierError`] for unified error handling across the library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Malformed content stream.
    #[error("tokenize error at byte {offset}: {message}")]
    Tokenize { offset: usize, message: String },

    /// Text state could not be reconstructed for a page.
    #[error("index error on page {page}: {message}")]
    Index { page: usize, message: String },

    /// Error writing the document.
    #[error("serialize error: {0}")]
    Serialize(String),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] PdfModifierError),
}

impl BackendError {
    pub(crate) fn tokenize(offset: usize, message: impl Into<String>) -> Self {
        BackendError::Tokenize {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn index(page: usize, message: impl Into<String>) -> Self {
        BackendError::Index {
            page,
            message: message.into(),
        }
    }
}

impl From<BackendError> for PdfModifierError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) => PdfModifierError::Parse(msg),
            BackendError::Tokenize { offset, message } => {
                PdfModifierError::Tokenize { offset, message }
            }
            BackendError::Index { page, message } => PdfModifierError::Index { page, message },
            BackendError::Serialize(msg) => PdfModifierError::Serialize(msg),
            BackendError::Io(e) => PdfModifierError::Serialize(e.to_string()),
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfmodifier_core::ErrorKind;

    #[test]
    fn backend_error_parse() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn backend_error_tokenize_display() {
        let err = BackendError::tokenize(17, "Tj expects 1 operand, found 0");
        assert_eq!(
            err.to_string(),
            "tokenize error at byte 17: Tj expects 1 operand, found 0"
        );
    }

    #[test]
    fn backend_error_io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::WriteZero, "sink closed");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        let converted: PdfModifierError = err.into();
        assert_eq!(converted.kind(), ErrorKind::Serialize);
    }

    #[test]
    fn backend_error_conversions_keep_kind() {
        let cases = [
            (BackendError::Parse("x".into()), ErrorKind::Parse),
            (BackendError::tokenize(0, "x"), ErrorKind::Tokenize),
            (BackendError::index(2, "x"), ErrorKind::Index),
            (BackendError::Serialize("x".into()), ErrorKind::Serialize),
        ];
        for (backend, kind) in cases {
            let converted: PdfModifierError = backend.into();
            assert_eq!(converted.kind(), kind);
        }
    }

    #[test]
    fn backend_error_index_keeps_page() {
        let converted: PdfModifierError = BackendError::index(4, "font /F2 not found").into();
        assert_eq!(
            converted,
            PdfModifierError::Index {
                page: 4,
                message: "font /F2 not found".to_string()
            }
        );
    }

    #[test]
    fn backend_error_core_passthrough() {
        let original = PdfModifierError::ResourceLimitExceeded {
            limit_name: "max_input_bytes".to_string(),
            limit_value: 1024,
            actual_value: 2048,
        };
        let backend = BackendError::Core(original.clone());
        let converted: PdfModifierError = backend.into();
        assert_eq!(converted, original);
    }

    #[test]
    fn backend_error_implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(BackendError::Parse("test".to_string()));
        assert_eq!(err.to_string(), "PDF parse error: test");
    }
}
