//! Error types for pdfmodifier.
//!
//! Provides [`PdfModifierError`], the fatal error returned by every
//! pipeline stage, and [`ErrorKind`], its machine-readable category.
//! Per-spec failures that do not abort a batch are not errors; they are
//! reported through [`SkipReason`](crate::SkipReason) instead.

use std::fmt;

/// Fatal error types for PDF text modification.
///
/// Any of these stops the current operation; no partial output is
/// produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfModifierError {
    /// The input is not a readable PDF, or its object graph is broken.
    Parse(String),
    /// A content stream is malformed (bad operator arity, unterminated string).
    Tokenize {
        /// Byte offset in the decoded stream where the problem was found.
        offset: usize,
        /// Description of the problem.
        message: String,
    },
    /// Text state could not be reconstructed (missing font, text shown before `Tf`).
    Index {
        /// Page index (0-based).
        page: usize,
        /// Description of the problem.
        message: String,
    },
    /// Text could not be mapped to or from a font's character codes.
    Encoding(String),
    /// The modified document could not be written out.
    Serialize(String),
    /// A configured resource limit was exceeded.
    ResourceLimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_input_bytes").
        limit_name: String,
        /// The configured limit value.
        limit_value: usize,
        /// The actual value that exceeded the limit.
        actual_value: usize,
    },
}

/// Machine-readable category of a [`PdfModifierError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ErrorKind {
    Parse,
    Tokenize,
    Index,
    Encoding,
    Serialize,
    ResourceLimit,
}

impl ErrorKind {
    /// Returns the string tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::Tokenize => "TOKENIZE_ERROR",
            ErrorKind::Index => "INDEX_ERROR",
            ErrorKind::Encoding => "ENCODING_ERROR",
            ErrorKind::Serialize => "SERIALIZE_ERROR",
            ErrorKind::ResourceLimit => "RESOURCE_LIMIT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PdfModifierError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PdfModifierError::Parse(_) => ErrorKind::Parse,
            PdfModifierError::Tokenize { .. } => ErrorKind::Tokenize,
            PdfModifierError::Index { .. } => ErrorKind::Index,
            PdfModifierError::Encoding(_) => ErrorKind::Encoding,
            PdfModifierError::Serialize(_) => ErrorKind::Serialize,
            PdfModifierError::ResourceLimitExceeded { .. } => ErrorKind::ResourceLimit,
        }
    }
}

impl fmt::Display for PdfModifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfModifierError::Parse(msg) => write!(f, "parse error: {msg}"),
            PdfModifierError::Tokenize { offset, message } => {
                write!(f, "tokenize error at byte {offset}: {message}")
            }
            PdfModifierError::Index { page, message } => {
                write!(f, "index error on page {page}: {message}")
            }
            PdfModifierError::Encoding(msg) => write!(f, "encoding error: {msg}"),
            PdfModifierError::Serialize(msg) => write!(f, "serialize error: {msg}"),
            PdfModifierError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
            } => write!(
                f,
                "resource limit exceeded: {limit_name} (limit: {limit_value}, actual: {actual_value})"
            ),
        }
    }
}

impl std::error::Error for PdfModifierError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = PdfModifierError::Tokenize {
            offset: 42,
            message: "unterminated literal string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tokenize error at byte 42: unterminated literal string"
        );

        let err = PdfModifierError::Index {
            page: 3,
            message: "font /F9 not found".to_string(),
        };
        assert_eq!(err.to_string(), "index error on page 3: font /F9 not found");
    }

    #[test]
    fn display_resource_limit() {
        let err = PdfModifierError::ResourceLimitExceeded {
            limit_name: "max_input_bytes".to_string(),
            limit_value: 10,
            actual_value: 20,
        };
        assert_eq!(
            err.to_string(),
            "resource limit exceeded: max_input_bytes (limit: 10, actual: 20)"
        );
    }

    #[test]
    fn kind_maps_every_variant() {
        assert_eq!(PdfModifierError::Parse("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(
            PdfModifierError::Encoding("x".into()).kind(),
            ErrorKind::Encoding
        );
        assert_eq!(
            PdfModifierError::Serialize("x".into()).kind(),
            ErrorKind::Serialize
        );
        assert_eq!(ErrorKind::Index.as_str(), "INDEX_ERROR");
    }

    #[test]
    fn is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&PdfModifierError::Parse("bad header".into()));
    }
}
