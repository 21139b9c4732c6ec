//! ToUnicode CMap parser.
//!
//! Parses CMap data embedded in PDF `/ToUnicode` streams to convert glyph
//! codes to Unicode text, and builds the inverse table used to re-encode
//! replacement text. Supports `begincodespacerange`, `beginbfchar` and
//! `beginbfrange` (both the offset and the array form) with UTF-16BE
//! destination values.

use std::collections::HashMap;

use crate::error::BackendError;

/// Upper bound on codes expanded from a single bfrange entry.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// A parsed ToUnicode CMap.
///
/// Character codes are 1 or 2 bytes wide. Unicode values may be single
/// characters or multi-character strings (e.g., ligatures like "fi").
#[derive(Debug, Clone, Default)]
pub struct CMap {
    mappings: HashMap<u32, String>,
    /// Unicode string → lowest code producing it.
    reverse: HashMap<String, u32>,
    /// Code width in bytes, from the codespace range or the source codes.
    code_bytes: Option<usize>,
}

/// A lexical token inside a CMap section.
#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    ArrayStart,
    ArrayEnd,
}

impl CMap {
    /// Parse a ToUnicode CMap from its raw byte content.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();
        let mut code_bytes = None;

        for section in sections(&text, "begincodespacerange", "endcodespacerange") {
            if let Some(Token::Hex(low)) = tokens(section).first() {
                code_bytes = Some(low.len().div_ceil(2).max(1));
            }
        }

        for section in sections(&text, "beginbfchar", "endbfchar") {
            let toks = tokens(section);
            for pair in toks.chunks(2) {
                if let [Token::Hex(src), Token::Hex(dst)] = pair {
                    code_bytes.get_or_insert(src.len().div_ceil(2).max(1));
                    mappings.insert(parse_hex_code(src)?, decode_utf16be_hex(dst)?);
                }
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            parse_bfrange_section(section, &mut mappings, &mut code_bytes)?;
        }

        let mut codes: Vec<u32> = mappings.keys().copied().collect();
        codes.sort_unstable();
        let mut reverse = HashMap::with_capacity(codes.len());
        for code in codes {
            if let Some(text) = mappings.get(&code) {
                reverse.entry(text.clone()).or_insert(code);
            }
        }

        Ok(CMap {
            mappings,
            reverse,
            code_bytes,
        })
    }

    /// Look up the Unicode string for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(|s| s.as_str())
    }

    /// Find the lowest code that maps to exactly `text`.
    pub fn code_for(&self, text: &str) -> Option<u32> {
        self.reverse.get(text).copied()
    }

    /// Code width in bytes declared by the CMap, if any.
    pub fn code_bytes(&self) -> Option<usize> {
        self.code_bytes
    }

    /// Returns the number of mappings in this CMap.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns true if this CMap has no mappings.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Bodies of all `begin…end` sections with the given keywords.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut search_from = 0;
    while let Some(start) = text[search_from..].find(begin) {
        let body_start = search_from + start + begin.len();
        let Some(len) = text[body_start..].find(end) else {
            break;
        };
        found.push(&text[body_start..body_start + len]);
        search_from = body_start + len + end.len();
    }
    found
}

/// Split a section into hex strings and array brackets; everything else
/// (decimal numbers, comments) is ignored.
fn tokens(section: &str) -> Vec<Token<'_>> {
    let mut out = Vec::new();
    let mut rest = section;
    while let Some(idx) = rest.find(['<', '[', ']']) {
        match rest.as_bytes()[idx] {
            b'[' => {
                out.push(Token::ArrayStart);
                rest = &rest[idx + 1..];
            }
            b']' => {
                out.push(Token::ArrayEnd);
                rest = &rest[idx + 1..];
            }
            _ => {
                let Some(len) = rest[idx + 1..].find('>') else {
                    break;
                };
                out.push(Token::Hex(rest[idx + 1..idx + 1 + len].trim()));
                rest = &rest[idx + 1 + len + 1..];
            }
        }
    }
    out
}

/// Parse a beginbfrange...endbfrange section.
///
/// Entries are `<srcLow> <srcHigh> <dstStart>` or
/// `<srcLow> <srcHigh> [<dst1> <dst2> ...]`.
fn parse_bfrange_section(
    section: &str,
    mappings: &mut HashMap<u32, String>,
    code_bytes: &mut Option<usize>,
) -> Result<(), BackendError> {
    let toks = tokens(section);
    let mut i = 0;
    while i + 2 < toks.len() {
        let (Token::Hex(low_hex), Token::Hex(high_hex)) = (&toks[i], &toks[i + 1]) else {
            i += 1;
            continue;
        };
        code_bytes.get_or_insert(low_hex.len().div_ceil(2).max(1));
        let src_low = parse_hex_code(low_hex)?;
        let src_high = parse_hex_code(high_hex)?.min(src_low.saturating_add(MAX_RANGE_SPAN));
        i += 2;

        match &toks[i] {
            Token::Hex(dst_hex) => {
                let dst = decode_utf16be_hex(dst_hex)?;
                let mut units: Vec<u16> = dst.encode_utf16().collect();
                for code in src_low..=src_high {
                    if let Ok(s) = String::from_utf16(&units) {
                        mappings.insert(code, s);
                    }
                    // the last code unit increments across the range
                    if let Some(last) = units.last_mut() {
                        *last = last.wrapping_add(1);
                    }
                }
                i += 1;
            }
            Token::ArrayStart => {
                i += 1;
                let mut code = src_low;
                while let Some(Token::Hex(dst_hex)) = toks.get(i) {
                    if code <= src_high {
                        mappings.insert(code, decode_utf16be_hex(dst_hex)?);
                    }
                    code += 1;
                    i += 1;
                }
                if toks.get(i) == Some(&Token::ArrayEnd) {
                    i += 1;
                }
            }
            Token::ArrayEnd => i += 1,
        }
    }
    Ok(())
}

/// Parse a hex string like "0041" into a u32 character code.
fn parse_hex_code(hex: &str) -> Result<u32, BackendError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| BackendError::Parse(format!("invalid hex code '{hex}' in CMap: {e}")))
}

/// Decode a hex string as UTF-16BE code units into a Unicode string.
///
/// A 2-digit value is treated as a single code unit (`41` → `0041`).
fn decode_utf16be_hex(hex: &str) -> Result<String, BackendError> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() == 2 {
        return decode_utf16be_hex(&format!("00{hex}"));
    }
    if hex.len() % 4 != 0 {
        return Err(BackendError::Parse(format!(
            "UTF-16BE hex string must have length divisible by 4, got '{hex}'"
        )));
    }

    let mut code_units = Vec::with_capacity(hex.len() / 4);
    for i in (0..hex.len()).step_by(4) {
        let chunk = &hex[i..i + 4];
        let unit = u16::from_str_radix(chunk, 16)
            .map_err(|e| BackendError::Parse(format!("invalid hex in UTF-16BE '{chunk}': {e}")))?;
        code_units.push(unit);
    }

    Ok(String::from_utf16_lossy(&code_units))
}
