//! Font inventory entries reported to callers.

use crate::encoding::StandardEncoding;

/// How a font maps character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FontKind {
    /// One byte per code (Type1, TrueType, Type3).
    Simple,
    /// Two bytes per code through a CID font (Type0, Identity-H/V).
    Composite,
}

/// Description of one font resource used on a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontInfo {
    /// Page index (0-based).
    pub page: usize,
    /// Resource name in the page's `/Font` dictionary.
    pub resource_name: String,
    pub base_font: String,
    /// `/Subtype` of the font dictionary.
    pub subtype: String,
    pub kind: FontKind,
    /// Whether a font program is embedded.
    pub embedded: bool,
    /// Whether the base font name carries a subset tag (`ABCDEF+`).
    pub subset: bool,
    /// Whether a `/ToUnicode` CMap is present.
    pub has_to_unicode: bool,
    /// Standard base encoding, if the font uses one.
    pub encoding: Option<StandardEncoding>,
}

/// `true` if the name starts with a six-uppercase-letter subset tag.
pub fn is_subset_name(base_font: &str) -> bool {
    let bytes = base_font.as_bytes();
    bytes.len() > 7 && bytes[6] == b'+' && bytes[..6].iter().all(u8::is_ascii_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subset_tag_detection() {
        assert!(is_subset_name("ABCDEF+Helvetica"));
        assert!(!is_subset_name("Helvetica"));
        assert!(!is_subset_name("ABCDE+Helvetica"));
        assert!(!is_subset_name("abcdef+Helvetica"));
        assert!(!is_subset_name("ABCDEF+"));
    }
}
