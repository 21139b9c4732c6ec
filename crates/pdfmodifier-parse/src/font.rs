//! Font resolution: code ↔ Unicode mapping and glyph widths.
//!
//! A [`Font`] is built from a page's `/Font` resource entry. Decoding
//! prefers the `/ToUnicode` CMap, then the simple-font encoding (base
//! encoding plus `/Differences`). Encoding replacement text runs the same
//! tables in reverse.

use std::collections::HashMap;
use std::fmt;

use lopdf::{Dictionary, Object};
use pdfmodifier_core::{
    FontEncoding, FontInfo, FontKind, StandardEncoding, Substitution, UnencodablePolicy,
    glyph_name_to_char, is_subset_name,
};
use tracing::{debug, warn};

use crate::cmap::CMap;
use crate::document::{Document, display_name, object_to_f64, object_to_name};
use crate::error::BackendError;
use crate::standard_fonts::{self, StandardFontMetrics};

/// Default ascent (in glyph space units, 1/1000 of text space).
const DEFAULT_ASCENT: f64 = 750.0;
/// Default descent (in glyph space units, negative).
const DEFAULT_DESCENT: f64 = -250.0;
/// Width for glyphs of fonts with neither `/Widths` nor built-in metrics.
const DEFAULT_WIDTH: f64 = 600.0;
/// `/DW` default for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Glyph advance widths, in glyph space units.
#[derive(Debug, Clone)]
enum Widths {
    Simple {
        /// `/FirstChar` and the `/Widths` array, when present.
        explicit: Option<(u32, Vec<f64>)>,
        missing_width: f64,
        standard: Option<StandardFontMetrics>,
    },
    Composite {
        default_width: f64,
        map: HashMap<u32, f64>,
    },
}

/// A resolved font resource.
#[derive(Debug, Clone)]
pub struct Font {
    resource_name: String,
    base_font: String,
    subtype: String,
    kind: FontKind,
    encoding: Option<FontEncoding>,
    to_unicode: Option<CMap>,
    widths: Widths,
    embedded: bool,
    ascent: f64,
    descent: f64,
}

/// Replacement text converted to font codes.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedText {
    /// Raw string bytes to place in a show-text operand.
    pub bytes: Vec<u8>,
    /// Characters swapped under [`UnencodablePolicy::Substitute`].
    pub substitutions: Vec<Substitution>,
}

/// A character the font has no code (or no glyph) for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unencodable {
    pub character: char,
    /// Base font name.
    pub font: String,
}

impl fmt::Display for Unencodable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "character {:?} (U+{:04X}) cannot be encoded in font {}",
            self.character, self.character as u32, self.font
        )
    }
}

impl std::error::Error for Unencodable {}

impl Font {
    /// Build a font from its dictionary.
    ///
    /// `resource_name` is the key under the page's `/Font` resources
    /// (without the leading slash).
    pub fn from_dict(
        doc: &Document,
        resource_name: &str,
        dict: &Dictionary,
    ) -> Result<Self, BackendError> {
        let subtype = dict
            .get(b"Subtype")
            .ok()
            .and_then(object_to_name)
            .unwrap_or_else(|| "Type1".to_string());
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(object_to_name)
            .unwrap_or_else(|| resource_name.to_string());

        let to_unicode = load_to_unicode(doc, dict);

        let font = if subtype == "Type0" {
            let descendant = descendant_font(doc, dict)?;
            let descriptor = descendant.and_then(|d| font_descriptor(doc, d));
            let (ascent, descent) = descriptor_metrics(descriptor, None);
            if let Some(encoding) = dict.get(b"Encoding").ok().and_then(object_to_name) {
                if encoding != "Identity-H" && encoding != "Identity-V" {
                    warn!(font = %base_font, encoding = %encoding, "non-identity CMap treated as 2-byte codes");
                }
            }
            let widths = Widths::Composite {
                default_width: descendant
                    .and_then(|d| d.get(b"DW").ok())
                    .and_then(object_to_f64)
                    .unwrap_or(DEFAULT_CID_WIDTH),
                map: descendant
                    .and_then(|d| d.get(b"W").ok())
                    .map(|w| doc.resolve(w))
                    .and_then(|w| w.as_array().ok())
                    .map(|arr| parse_w_array(doc, arr))
                    .unwrap_or_default(),
            };
            Font {
                resource_name: resource_name.to_string(),
                base_font,
                subtype,
                kind: FontKind::Composite,
                encoding: None,
                to_unicode,
                widths,
                embedded: descriptor.is_some_and(has_font_file),
                ascent,
                descent,
            }
        } else {
            let standard = standard_fonts::lookup(&base_font);
            let descriptor = font_descriptor(doc, dict);
            let (ascent, descent) = descriptor_metrics(descriptor, standard);
            let explicit = simple_widths(doc, dict);
            let missing_width = descriptor
                .and_then(|d| d.get(b"MissingWidth").ok())
                .and_then(object_to_f64)
                .unwrap_or(if explicit.is_some() { 0.0 } else { DEFAULT_WIDTH });
            Font {
                resource_name: resource_name.to_string(),
                encoding: Some(simple_encoding(doc, dict, &subtype)),
                base_font,
                subtype,
                kind: FontKind::Simple,
                to_unicode,
                widths: Widths::Simple {
                    explicit,
                    missing_width,
                    standard,
                },
                embedded: descriptor.is_some_and(has_font_file),
                ascent,
                descent,
            }
        };

        debug!(
            resource = %font.resource_name,
            base_font = %font.base_font,
            subtype = %font.subtype,
            embedded = font.embedded,
            to_unicode = font.to_unicode.is_some(),
            "resolved font"
        );
        Ok(font)
    }

    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    pub fn base_font(&self) -> &str {
        &self.base_font
    }

    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// Ascent and descent in glyph space units.
    pub fn vertical_metrics(&self) -> (f64, f64) {
        (self.ascent, self.descent)
    }

    /// Bytes per character code.
    pub fn code_bytes(&self) -> usize {
        match self.kind {
            FontKind::Simple => 1,
            FontKind::Composite => 2,
        }
    }

    /// Split a string operand into character codes.
    ///
    /// A trailing odd byte of a two-byte string forms its own code.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        bytes
            .chunks(self.code_bytes())
            .map(|chunk| chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
            .collect()
    }

    /// Decode a string operand to Unicode. Codes without a mapping
    /// become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for code in self.codes(bytes) {
            if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.lookup(code)) {
                out.push_str(text);
                continue;
            }
            let ch = match (&self.encoding, u8::try_from(code)) {
                (Some(encoding), Ok(byte)) => encoding.decode(byte),
                _ => None,
            };
            out.push(ch.unwrap_or('\u{FFFD}'));
        }
        out
    }

    /// Advance width of one code in glyph space units.
    pub fn width(&self, code: u32) -> f64 {
        match &self.widths {
            Widths::Simple {
                explicit,
                missing_width,
                standard,
            } => {
                if let Some((first, widths)) = explicit {
                    if let Some(w) = code.checked_sub(*first).and_then(|i| widths.get(i as usize)) {
                        return *w;
                    }
                }
                match (standard, u8::try_from(code)) {
                    (Some(metrics), Ok(byte)) => metrics.width(byte),
                    _ => *missing_width,
                }
            }
            Widths::Composite { default_width, map } => {
                map.get(&code).copied().unwrap_or(*default_width)
            }
        }
    }

    /// Horizontal advance of a string operand in unscaled text space.
    ///
    /// Each code contributes `(w/1000 * size + Tc + Tw) * Th`; word spacing
    /// applies to the single-byte code 32 only.
    pub fn string_width(
        &self,
        bytes: &[u8],
        font_size: f64,
        char_spacing: f64,
        word_spacing: f64,
        horizontal_scaling: f64,
    ) -> f64 {
        self.codes(bytes)
            .into_iter()
            .map(|code| {
                let mut advance = self.width(code) / 1000.0 * font_size + char_spacing;
                if self.code_bytes() == 1 && code == 32 {
                    advance += word_spacing;
                }
                advance * horizontal_scaling
            })
            .sum()
    }

    /// Encode replacement text into font codes.
    ///
    /// # Errors
    ///
    /// [`Unencodable`] for the first character with no usable code (after
    /// substitution, when the policy allows it).
    pub fn encode(
        &self,
        text: &str,
        policy: UnencodablePolicy,
    ) -> Result<EncodedText, Unencodable> {
        let mut bytes = Vec::with_capacity(text.len() * self.code_bytes());
        let mut substitutions = Vec::new();
        for ch in text.chars() {
            let code = match (self.encode_char(ch), policy) {
                (Some(code), _) => code,
                (None, UnencodablePolicy::Substitute(substitute)) => {
                    let code = self
                        .encode_char(substitute)
                        .ok_or_else(|| self.unencodable(substitute))?;
                    substitutions.push(Substitution {
                        original: ch,
                        substitute,
                    });
                    code
                }
                (None, UnencodablePolicy::Fail) => return Err(self.unencodable(ch)),
            };
            if self.code_bytes() == 2 {
                bytes.push((code >> 8) as u8);
            }
            bytes.push(code as u8);
        }
        if !substitutions.is_empty() {
            warn!(font = %self.base_font, count = substitutions.len(), "substituted unencodable characters");
        }
        Ok(EncodedText {
            bytes,
            substitutions,
        })
    }

    /// Code for a single character, if the font can show it.
    fn encode_char(&self, ch: char) -> Option<u32> {
        let mut buf = [0u8; 4];
        let key: &str = ch.encode_utf8(&mut buf);
        let from_cmap = self.to_unicode.as_ref().and_then(|cmap| cmap.code_for(key));
        let code = match (from_cmap, &self.encoding) {
            (Some(code), _) => Some(code),
            (None, Some(encoding)) => encoding.encode_char(ch).map(u32::from),
            (None, None) => None,
        }?;
        let max_code = if self.code_bytes() == 2 { 0xFFFF } else { 0xFF };
        (code <= max_code && self.has_glyph(code)).then_some(code)
    }

    /// Subset simple fonts only carry glyphs for the codes they list with
    /// a non-zero width.
    fn has_glyph(&self, code: u32) -> bool {
        if !(self.embedded && is_subset_name(&self.base_font)) {
            return true;
        }
        match &self.widths {
            Widths::Simple {
                explicit: Some((first, widths)),
                ..
            } => code
                .checked_sub(*first)
                .and_then(|i| widths.get(i as usize))
                .is_some_and(|w| *w > 0.0),
            _ => true,
        }
    }

    fn unencodable(&self, character: char) -> Unencodable {
        Unencodable {
            character,
            font: self.base_font.clone(),
        }
    }

    /// Inventory entry for this font on the given page.
    pub fn info(&self, page: usize) -> FontInfo {
        FontInfo {
            page,
            resource_name: self.resource_name.clone(),
            base_font: self.base_font.clone(),
            subtype: self.subtype.clone(),
            kind: self.kind,
            embedded: self.embedded,
            subset: is_subset_name(&self.base_font),
            has_to_unicode: self.to_unicode.is_some(),
            encoding: self.encoding.as_ref().and_then(FontEncoding::base),
        }
    }
}

/// Look up `name` in a resource dictionary's `/Font` entry and build it.
///
/// Returns `Ok(None)` when the name is not present.
/// `name` is the raw key, matched byte for byte.
pub fn load_font(
    doc: &Document,
    resources: &Dictionary,
    name: &[u8],
) -> Result<Option<Font>, BackendError> {
    let Some(fonts) = font_resources(doc, resources) else {
        return Ok(None);
    };
    match fonts.get(name) {
        Ok(obj) => {
            let name = display_name(name);
            let dict = doc.resolve(obj).as_dict().map_err(|_| {
                BackendError::Parse(format!("font resource /{name} is not a dictionary"))
            })?;
            Font::from_dict(doc, &name, dict).map(Some)
        }
        Err(_) => Ok(None),
    }
}

/// Every font in a resource dictionary, sorted by resource name.
pub fn load_fonts(doc: &Document, resources: &Dictionary) -> Result<Vec<Font>, BackendError> {
    let Some(fonts) = font_resources(doc, resources) else {
        return Ok(Vec::new());
    };
    let mut names: Vec<&[u8]> = fonts.iter().map(|(key, _)| key.as_slice()).collect();
    names.sort();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if let Some(font) = load_font(doc, resources, name)? {
            out.push(font);
        }
    }
    Ok(out)
}

fn font_resources<'a>(doc: &'a Document, resources: &'a Dictionary) -> Option<&'a Dictionary> {
    resources
        .get(b"Font")
        .ok()
        .map(|obj| doc.resolve(obj))
        .and_then(|obj| obj.as_dict().ok())
}

fn load_to_unicode(doc: &Document, dict: &Dictionary) -> Option<CMap> {
    let id = dict.get(b"ToUnicode").ok()?.as_reference().ok()?;
    let data = match doc.stream_content(id) {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "unreadable /ToUnicode stream ignored");
            return None;
        }
    };
    match CMap::parse(&data) {
        Ok(cmap) if !cmap.is_empty() => Some(cmap),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "malformed /ToUnicode CMap ignored");
            None
        }
    }
}

fn descendant_font<'a>(
    doc: &'a Document,
    dict: &'a Dictionary,
) -> Result<Option<&'a Dictionary>, BackendError> {
    let Ok(descendants) = dict.get(b"DescendantFonts") else {
        return Ok(None);
    };
    let first = doc
        .resolve(descendants)
        .as_array()
        .ok()
        .and_then(|arr| arr.first());
    match first {
        Some(obj) => doc
            .resolve(obj)
            .as_dict()
            .map(Some)
            .map_err(|_| BackendError::Parse("/DescendantFonts entry is not a dictionary".into())),
        None => Ok(None),
    }
}

fn font_descriptor<'a>(doc: &'a Document, dict: &'a Dictionary) -> Option<&'a Dictionary> {
    dict.get(b"FontDescriptor")
        .ok()
        .map(|obj| doc.resolve(obj))
        .and_then(|obj| obj.as_dict().ok())
}

const FONT_FILE_KEYS: [&[u8]; 3] = [b"FontFile", b"FontFile2", b"FontFile3"];

fn has_font_file(descriptor: &Dictionary) -> bool {
    FONT_FILE_KEYS.iter().any(|key| descriptor.get(key).is_ok())
}

fn descriptor_metrics(
    descriptor: Option<&Dictionary>,
    standard: Option<StandardFontMetrics>,
) -> (f64, f64) {
    let read = |key: &[u8]| {
        descriptor
            .and_then(|d| d.get(key).ok())
            .and_then(object_to_f64)
            .filter(|v| *v != 0.0)
    };
    let ascent = read(b"Ascent")
        .or(standard.map(|m| m.ascent))
        .unwrap_or(DEFAULT_ASCENT);
    let descent = read(b"Descent")
        .or(standard.map(|m| m.descent))
        .unwrap_or(DEFAULT_DESCENT);
    (ascent, descent)
}

/// `/FirstChar` plus the `/Widths` array of a simple font.
fn simple_widths(doc: &Document, dict: &Dictionary) -> Option<(u32, Vec<f64>)> {
    let first = dict
        .get(b"FirstChar")
        .ok()
        .and_then(object_to_f64)
        .unwrap_or(0.0);
    let widths = doc.resolve(dict.get(b"Widths").ok()?).as_array().ok()?;
    let values = widths
        .iter()
        .map(|w| object_to_f64(doc.resolve(w)).unwrap_or(0.0))
        .collect();
    Some((first.max(0.0) as u32, values))
}

/// Encoding table for a simple font: `/Encoding` name or dictionary
/// (`/BaseEncoding` + `/Differences`), else a default by font type.
fn simple_encoding(doc: &Document, dict: &Dictionary, subtype: &str) -> FontEncoding {
    let default = if subtype == "Type1" {
        StandardEncoding::Standard
    } else {
        StandardEncoding::WinAnsi
    };
    let Some(obj) = dict.get(b"Encoding").ok().map(|o| doc.resolve(o)) else {
        return FontEncoding::from_standard(default);
    };
    match obj {
        Object::Name(name) => {
            let name = String::from_utf8_lossy(name);
            FontEncoding::from_standard(StandardEncoding::from_name(&name).unwrap_or(default))
        }
        Object::Dictionary(enc) => {
            let base = enc
                .get(b"BaseEncoding")
                .ok()
                .and_then(object_to_name)
                .and_then(|n| StandardEncoding::from_name(&n))
                .unwrap_or(default);
            let mut encoding = FontEncoding::from_standard(base);
            if let Ok(diffs) = enc.get(b"Differences").map(|d| doc.resolve(d)) {
                if let Ok(arr) = diffs.as_array() {
                    encoding.apply_differences(&parse_differences(arr));
                }
            }
            encoding
        }
        _ => FontEncoding::from_standard(default),
    }
}

/// Parse a `/Differences` array: a code followed by glyph names for
/// consecutive codes, repeated.
fn parse_differences(arr: &[Object]) -> Vec<(u8, char)> {
    let mut out = Vec::new();
    let mut code: i64 = 0;
    for item in arr {
        match item {
            Object::Integer(n) => code = *n,
            Object::Name(name) => {
                let glyph = String::from_utf8_lossy(name);
                if let (Ok(byte), Some(ch)) = (u8::try_from(code), glyph_name_to_char(&glyph)) {
                    out.push((byte, ch));
                }
                code += 1;
            }
            _ => {}
        }
    }
    out
}

/// Parse a CID font `/W` array.
///
/// Entries are either `c [w1 w2 ...]` (consecutive CIDs starting at `c`)
/// or `c_first c_last w` (one width for a CID range).
fn parse_w_array(doc: &Document, arr: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < arr.len() {
        let Some(start) = object_to_f64(doc.resolve(&arr[i])).map(|v| v as u32) else {
            i += 1;
            continue;
        };
        match arr.get(i + 1).map(|o| doc.resolve(o)) {
            Some(Object::Array(list)) => {
                for (offset, w) in list.iter().enumerate() {
                    if let Some(w) = object_to_f64(doc.resolve(w)) {
                        widths.insert(start.saturating_add(offset as u32), w);
                    }
                }
                i += 2;
            }
            Some(end_obj) => {
                let end = object_to_f64(end_obj).map(|v| v as u32).unwrap_or(start);
                if let Some(w) = arr.get(i + 2).and_then(|o| object_to_f64(doc.resolve(o))) {
                    // cap pathological ranges
                    for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                        widths.insert(cid, w);
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}
