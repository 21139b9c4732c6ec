//! Content stream tokenizer and encoder.
//!
//! [`decode`] parses raw (already decompressed) content stream bytes into a
//! sequence of [`Operation`]s, each carrying its classified [`Operator`] and
//! the byte range it occupied in the input. [`encode`] and
//! [`encode_operator`] write operators back out so that decoding the result
//! yields the same operators again.

use std::ops::Range;

use tracing::warn;

use crate::error::BackendError;

/// A PDF content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real (floating-point) number (e.g., `3.14`, `.5`).
    Real(f64),
    /// Name object (e.g., `/F1`, `/DeviceRGB`). Stored without the leading `/`,
    /// as raw bytes after `#XX` escapes are decoded.
    Name(Vec<u8>),
    /// Literal string delimited by parentheses, stored as unescaped bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string delimited by angle brackets, stored as decoded bytes.
    HexString(Vec<u8>),
    /// Array of operands (e.g., `[1 2 3]`).
    Array(Vec<Operand>),
    /// Boolean value (`true` or `false`).
    Boolean(bool),
    /// The null object.
    Null,
    /// Dictionary object (`<< /Key value ... >>`).
    Dictionary(Vec<(Vec<u8>, Operand)>),
    /// Source bytes between `BI` and `EI` of an inline image, kept verbatim.
    InlineImage(Vec<u8>),
}

impl Operand {
    /// Numeric value of an integer or real operand.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Operand::Integer(i) => Some(*i as f64),
            Operand::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Bytes of a literal or hex string operand.
    pub fn as_string_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::LiteralString(s) | Operand::HexString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }
}

/// Which show-text operator produced a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    /// `string Tj`
    Tj,
    /// `array TJ`
    TJ,
    /// `string '` (move to next line, show)
    Quote,
    /// `aw ac string "` (set spacing, move to next line, show)
    DoubleQuote,
}

impl ShowKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ShowKind::Tj => "Tj",
            ShowKind::TJ => "TJ",
            ShowKind::Quote => "'",
            ShowKind::DoubleQuote => "\"",
        }
    }
}

/// Which positioning operator moved the text or graphics origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionKind {
    Td,
    TD,
    Tm,
    TStar,
    Cm,
}

impl PositionKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PositionKind::Td => "Td",
            PositionKind::TD => "TD",
            PositionKind::Tm => "Tm",
            PositionKind::TStar => "T*",
            PositionKind::Cm => "cm",
        }
    }
}

/// A content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    ShowText {
        kind: ShowKind,
        operands: Vec<Operand>,
    },
    SetFont {
        operands: Vec<Operand>,
    },
    SetPosition {
        kind: PositionKind,
        operands: Vec<Operand>,
    },
    /// Any other operator, including inline images (`BI`).
    Other {
        name: String,
        operands: Vec<Operand>,
    },
}

impl Operator {
    /// Classify an operator keyword.
    pub fn new(name: &str, operands: Vec<Operand>) -> Self {
        let show = |kind| Operator::ShowText { kind, operands: Vec::new() };
        let position = |kind| Operator::SetPosition { kind, operands: Vec::new() };
        let mut op = match name {
            "Tj" => show(ShowKind::Tj),
            "TJ" => show(ShowKind::TJ),
            "'" => show(ShowKind::Quote),
            "\"" => show(ShowKind::DoubleQuote),
            "Tf" => Operator::SetFont {
                operands: Vec::new(),
            },
            "Td" => position(PositionKind::Td),
            "TD" => position(PositionKind::TD),
            "Tm" => position(PositionKind::Tm),
            "T*" => position(PositionKind::TStar),
            "cm" => position(PositionKind::Cm),
            _ => Operator::Other {
                name: name.to_string(),
                operands: Vec::new(),
            },
        };
        *op.operands_mut() = operands;
        op
    }

    /// The operator keyword.
    pub fn name(&self) -> &str {
        match self {
            Operator::ShowText { kind, .. } => kind.keyword(),
            Operator::SetFont { .. } => "Tf",
            Operator::SetPosition { kind, .. } => kind.keyword(),
            Operator::Other { name, .. } => name,
        }
    }

    pub fn operands(&self) -> &[Operand] {
        match self {
            Operator::ShowText { operands, .. }
            | Operator::SetFont { operands }
            | Operator::SetPosition { operands, .. }
            | Operator::Other { operands, .. } => operands,
        }
    }

    fn operands_mut(&mut self) -> &mut Vec<Operand> {
        match self {
            Operator::ShowText { operands, .. }
            | Operator::SetFont { operands }
            | Operator::SetPosition { operands, .. }
            | Operator::Other { operands, .. } => operands,
        }
    }

    pub fn is_show_text(&self) -> bool {
        matches!(self, Operator::ShowText { .. })
    }
}

/// An operator together with the bytes it occupied in the source stream.
///
/// The range runs from the first operand (or the keyword, if there are no
/// operands) through the end of the keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: Operator,
    pub byte_range: Range<usize>,
}

// =============================================================================
// Decoding
// =============================================================================

/// Parse content stream bytes into a sequence of operations.
///
/// Comments (% to end of line) are skipped. Inline images (BI/ID/EI) become
/// a single `BI` operator holding the verbatim source bytes.
///
/// # Errors
///
/// Returns [`BackendError::Tokenize`] for unterminated strings, arrays or
/// dictionaries and for known operators with the wrong operand count or
/// types.
pub fn decode(input: &[u8]) -> Result<Vec<Operation>, BackendError> {
    let mut ops = Vec::new();
    let mut operand_stack: Vec<Operand> = Vec::new();
    let mut operand_start: Option<usize> = None;
    let mut pos = 0;

    while pos < input.len() {
        skip_whitespace_and_comments(input, &mut pos);
        if pos >= input.len() {
            break;
        }

        let start = pos;
        let b = input[pos];

        match b {
            b'(' => {
                let s = parse_literal_string(input, &mut pos)?;
                operand_stack.push(Operand::LiteralString(s));
            }
            b'<' => {
                if input.get(pos + 1) == Some(&b'<') {
                    let dict = parse_dictionary(input, &mut pos)?;
                    operand_stack.push(Operand::Dictionary(dict));
                } else {
                    let s = parse_hex_string(input, &mut pos)?;
                    operand_stack.push(Operand::HexString(s));
                }
            }
            b'[' => {
                pos += 1;
                let arr = parse_array(input, &mut pos)?;
                operand_stack.push(Operand::Array(arr));
            }
            b'/' => {
                let name = parse_name(input, &mut pos);
                operand_stack.push(Operand::Name(name));
            }
            b'0'..=b'9' | b'+' | b'-' | b'.' => {
                let num = parse_number(input, &mut pos)?;
                operand_stack.push(num);
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                let keyword = parse_keyword(input, &mut pos);
                match keyword.as_str() {
                    "true" => operand_stack.push(Operand::Boolean(true)),
                    "false" => operand_stack.push(Operand::Boolean(false)),
                    "null" => operand_stack.push(Operand::Null),
                    "BI" => {
                        if !operand_stack.is_empty() {
                            warn!(offset = start, "dropping operands before inline image");
                            operand_stack.clear();
                            operand_start = None;
                        }
                        let raw = parse_inline_image(input, &mut pos)?;
                        ops.push(Operation {
                            operator: Operator::Other {
                                name: "BI".to_string(),
                                operands: vec![Operand::InlineImage(raw)],
                            },
                            byte_range: start..pos,
                        });
                    }
                    _ => {
                        let operands = std::mem::take(&mut operand_stack);
                        check_operands(&keyword, &operands, start)?;
                        let range_start = operand_start.take().unwrap_or(start);
                        ops.push(Operation {
                            operator: Operator::new(&keyword, operands),
                            byte_range: range_start..pos,
                        });
                        continue;
                    }
                }
            }
            b']' => {
                return Err(BackendError::tokenize(pos, "unexpected ']' outside array"));
            }
            _ => {
                // Skip stray bytes
                pos += 1;
                continue;
            }
        }

        if !operand_stack.is_empty() && operand_start.is_none() {
            operand_start = Some(start);
        }
    }

    if !operand_stack.is_empty() {
        warn!(
            count = operand_stack.len(),
            "ignoring trailing operands at end of content stream"
        );
    }

    Ok(ops)
}

/// Operand shape expected by a known operator.
#[derive(Debug, Clone, Copy)]
enum Arg {
    Number,
    String,
    Array,
    Name,
}

fn signature(name: &str) -> Option<&'static [Arg]> {
    use Arg::*;
    let sig: &'static [Arg] = match name {
        "Tj" | "'" => &[String],
        "TJ" => &[Array],
        "\"" => &[Number, Number, String],
        "Tf" => &[Name, Number],
        "Td" | "TD" => &[Number, Number],
        "Tm" | "cm" => &[Number, Number, Number, Number, Number, Number],
        "T*" | "BT" | "ET" | "q" | "Q" => &[],
        "Tc" | "Tw" | "Tz" | "TL" | "Ts" | "Tr" => &[Number],
        _ => return None,
    };
    Some(sig)
}

/// Validate operand count and types for the operators that drive text state.
fn check_operands(name: &str, operands: &[Operand], offset: usize) -> Result<(), BackendError> {
    let Some(sig) = signature(name) else {
        return Ok(());
    };
    if operands.len() != sig.len() {
        return Err(BackendError::tokenize(
            offset,
            format!(
                "{name} expects {} operand(s), found {}",
                sig.len(),
                operands.len()
            ),
        ));
    }
    for (i, (arg, operand)) in sig.iter().zip(operands).enumerate() {
        let ok = match arg {
            Arg::Number => operand.as_f64().is_some(),
            Arg::String => operand.as_string_bytes().is_some(),
            Arg::Array => matches!(operand, Operand::Array(_)),
            Arg::Name => matches!(operand, Operand::Name(_)),
        };
        if !ok {
            return Err(BackendError::tokenize(
                offset,
                format!("{name} operand {i} has the wrong type: {operand:?}"),
            ));
        }
    }
    Ok(())
}

/// Returns `true` if `b` is a PDF whitespace character.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// Returns `true` if `b` is a PDF delimiter character.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Skip whitespace and comments.
fn skip_whitespace_and_comments(input: &[u8], pos: &mut usize) {
    while *pos < input.len() {
        if is_whitespace(input[*pos]) {
            *pos += 1;
        } else if input[*pos] == b'%' {
            while *pos < input.len() && input[*pos] != b'\n' && input[*pos] != b'\r' {
                *pos += 1;
            }
        } else {
            break;
        }
    }
}

/// Parse a literal string `(...)` with balanced parentheses and escape sequences.
fn parse_literal_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BackendError> {
    let open = *pos;
    *pos += 1; // skip opening '('

    let mut result = Vec::new();
    let mut depth = 1u32;

    while *pos < input.len() {
        let b = input[*pos];
        match b {
            b'(' => {
                depth += 1;
                result.push(b'(');
                *pos += 1;
            }
            b')' => {
                depth -= 1;
                *pos += 1;
                if depth == 0 {
                    return Ok(result);
                }
                result.push(b')');
            }
            b'\\' => {
                *pos += 1;
                let Some(&escaped) = input.get(*pos) else {
                    break;
                };
                match escaped {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(0x08),
                    b'f' => result.push(0x0C),
                    b'(' | b')' | b'\\' => result.push(escaped),
                    b'\r' => {
                        // line continuation, CR or CRLF
                        *pos += 1;
                        if input.get(*pos) == Some(&b'\n') {
                            *pos += 1;
                        }
                        continue;
                    }
                    b'\n' => {
                        *pos += 1;
                        continue;
                    }
                    b'0'..=b'7' => {
                        let mut val = u32::from(escaped - b'0');
                        for _ in 0..2 {
                            match input.get(*pos + 1) {
                                Some(&d @ b'0'..=b'7') => {
                                    *pos += 1;
                                    val = val * 8 + u32::from(d - b'0');
                                }
                                _ => break,
                            }
                        }
                        // high-order overflow is ignored
                        result.push((val & 0xFF) as u8);
                    }
                    _ => result.push(escaped),
                }
                *pos += 1;
            }
            _ => {
                result.push(b);
                *pos += 1;
            }
        }
    }

    Err(BackendError::tokenize(open, "unterminated literal string"))
}

/// Parse a hex string `<...>`.
fn parse_hex_string(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BackendError> {
    let open = *pos;
    *pos += 1; // skip '<'

    let mut hex_chars = Vec::new();
    loop {
        let Some(&b) = input.get(*pos) else {
            return Err(BackendError::tokenize(open, "unterminated hex string"));
        };
        *pos += 1;
        if b == b'>' {
            break;
        }
        if !is_whitespace(b) {
            hex_chars.push(b);
        }
    }

    // odd digit count: final digit is followed by an implied 0
    if hex_chars.len() % 2 != 0 {
        hex_chars.push(b'0');
    }

    let mut result = Vec::with_capacity(hex_chars.len() / 2);
    for chunk in hex_chars.chunks(2) {
        let hi = hex_digit(chunk[0]).ok_or_else(|| bad_hex(open, chunk[0]))?;
        let lo = hex_digit(chunk[1]).ok_or_else(|| bad_hex(open, chunk[1]))?;
        result.push((hi << 4) | lo);
    }

    Ok(result)
}

fn bad_hex(offset: usize, b: u8) -> BackendError {
    BackendError::tokenize(offset, format!("invalid hex digit: {:?}", b as char))
}

/// Convert a hex digit character to its value (0-15).
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Parse one value inside an array or dictionary.
fn parse_nested_value(input: &[u8], pos: &mut usize) -> Result<Operand, BackendError> {
    let b = input[*pos];
    match b {
        b'/' => Ok(Operand::Name(parse_name(input, pos))),
        b'(' => Ok(Operand::LiteralString(parse_literal_string(input, pos)?)),
        b'<' => {
            if input.get(*pos + 1) == Some(&b'<') {
                Ok(Operand::Dictionary(parse_dictionary(input, pos)?))
            } else {
                Ok(Operand::HexString(parse_hex_string(input, pos)?))
            }
        }
        b'[' => {
            *pos += 1;
            Ok(Operand::Array(parse_array(input, pos)?))
        }
        b'0'..=b'9' | b'+' | b'-' | b'.' => parse_number(input, pos),
        b'a'..=b'z' | b'A'..=b'Z' => {
            let kw = parse_keyword(input, pos);
            match kw.as_str() {
                "true" => Ok(Operand::Boolean(true)),
                "false" => Ok(Operand::Boolean(false)),
                "null" => Ok(Operand::Null),
                _ => Ok(Operand::Name(kw.into_bytes())),
            }
        }
        _ => Err(BackendError::tokenize(
            *pos,
            format!("unexpected byte 0x{b:02X}"),
        )),
    }
}

/// Parse an array until `]`. Assumes `[` already consumed.
fn parse_array(input: &[u8], pos: &mut usize) -> Result<Vec<Operand>, BackendError> {
    let open = pos.saturating_sub(1);
    let mut elements = Vec::new();

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::tokenize(open, "unterminated array"));
        }
        if input[*pos] == b']' {
            *pos += 1;
            return Ok(elements);
        }
        elements.push(parse_nested_value(input, pos)?);
    }
}

/// Parse a dictionary `<< /Key value ... >>`. Assumes current bytes are `<<`.
fn parse_dictionary(
    input: &[u8],
    pos: &mut usize,
) -> Result<Vec<(Vec<u8>, Operand)>, BackendError> {
    let open = *pos;
    *pos += 2;

    let mut entries = Vec::new();

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::tokenize(open, "unterminated dictionary"));
        }
        if input[*pos] == b'>' && input.get(*pos + 1) == Some(&b'>') {
            *pos += 2;
            return Ok(entries);
        }
        if input[*pos] != b'/' {
            return Err(BackendError::tokenize(
                *pos,
                "expected name key in dictionary",
            ));
        }
        let key = parse_name(input, pos);

        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::tokenize(open, "unterminated dictionary"));
        }
        let value = parse_nested_value(input, pos)?;
        entries.push((key, value));
    }
}

/// Parse a `/Name` token. Assumes current byte is `/`.
fn parse_name(input: &[u8], pos: &mut usize) -> Vec<u8> {
    *pos += 1; // skip '/'

    let start = *pos;
    while *pos < input.len() && !is_whitespace(input[*pos]) && !is_delimiter(input[*pos]) {
        *pos += 1;
    }

    // #XX hex escapes
    let raw = &input[start..*pos];
    let mut name = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'#' && i + 2 < raw.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                name.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        name.push(raw[i]);
        i += 1;
    }
    name
}

/// Parse a number (integer or real).
fn parse_number(input: &[u8], pos: &mut usize) -> Result<Operand, BackendError> {
    let start = *pos;
    let mut has_dot = false;

    if *pos < input.len() && (input[*pos] == b'+' || input[*pos] == b'-') {
        *pos += 1;
    }

    while *pos < input.len() {
        let b = input[*pos];
        if b == b'.' {
            if has_dot {
                break;
            }
            has_dot = true;
            *pos += 1;
        } else if b.is_ascii_digit() {
            *pos += 1;
        } else {
            break;
        }
    }

    let token = &input[start..*pos];
    // ASCII by construction
    let s = String::from_utf8_lossy(token);
    let s = s.trim_start_matches('+');

    // "-" or "." alone read as zero
    if s.is_empty() || s == "-" || s == "." || s == "-." {
        return Ok(if has_dot {
            Operand::Real(0.0)
        } else {
            Operand::Integer(0)
        });
    }

    if has_dot {
        s.parse()
            .map(Operand::Real)
            .map_err(|_| BackendError::tokenize(start, format!("invalid real number: {s}")))
    } else {
        match s.parse() {
            Ok(val) => Ok(Operand::Integer(val)),
            // out-of-range integers degrade to reals
            Err(_) => s
                .parse()
                .map(Operand::Real)
                .map_err(|_| BackendError::tokenize(start, format!("invalid integer: {s}"))),
        }
    }
}

/// Parse a keyword: a letter, `*`, `'` or `"` followed by regular characters.
fn parse_keyword(input: &[u8], pos: &mut usize) -> String {
    let start = *pos;
    *pos += 1;
    if !matches!(input[start], b'\'' | b'"') {
        while *pos < input.len() {
            let b = input[*pos];
            if b.is_ascii_alphanumeric() || b == b'*' {
                *pos += 1;
            } else {
                break;
            }
        }
    }
    String::from_utf8_lossy(&input[start..*pos]).into_owned()
}

/// Scan an inline image after `BI`: dictionary entries, `ID`, data, `EI`.
/// Returns the verbatim bytes between `BI` and `EI`.
fn parse_inline_image(input: &[u8], pos: &mut usize) -> Result<Vec<u8>, BackendError> {
    let body_start = *pos;

    loop {
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::tokenize(
                body_start,
                "unterminated inline image (missing ID)",
            ));
        }

        if input[*pos] == b'I'
            && input.get(*pos + 1) == Some(&b'D')
            && input.get(*pos + 2).is_none_or(|&b| is_whitespace(b))
        {
            *pos += 2;
            // single whitespace separator after ID
            if *pos < input.len() {
                *pos += 1;
            }
            break;
        }

        if input[*pos] != b'/' {
            return Err(BackendError::tokenize(
                *pos,
                "expected name key in inline image dictionary",
            ));
        }
        parse_name(input, pos);
        skip_whitespace_and_comments(input, pos);
        if *pos >= input.len() {
            return Err(BackendError::tokenize(
                body_start,
                "unterminated inline image dictionary",
            ));
        }
        parse_nested_value(input, pos)?;
    }

    let data_start = *pos;
    while *pos + 1 < input.len() {
        if (*pos == data_start || is_whitespace(input[*pos - 1]))
            && input[*pos] == b'E'
            && input[*pos + 1] == b'I'
            && input
                .get(*pos + 2)
                .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
        {
            let raw = input[body_start..*pos].to_vec();
            *pos += 2; // skip "EI"
            return Ok(raw);
        }
        *pos += 1;
    }

    Err(BackendError::tokenize(
        body_start,
        "unterminated inline image (missing EI)",
    ))
}

// =============================================================================
// Encoding
// =============================================================================

/// Serialize operators, one per line.
pub fn encode(ops: &[Operator]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        write_operator(op, &mut out);
    }
    out
}

/// Serialize one operator: its operands separated by spaces, then the keyword.
pub fn encode_operator(op: &Operator) -> Vec<u8> {
    let mut out = Vec::new();
    write_operator(op, &mut out);
    out
}

fn write_operator(op: &Operator, out: &mut Vec<u8>) {
    if let Operator::Other { name, operands } = op {
        if name == "BI" {
            out.extend_from_slice(b"BI");
            for operand in operands {
                if let Operand::InlineImage(raw) = operand {
                    out.extend_from_slice(raw);
                }
            }
            out.extend_from_slice(b"EI");
            return;
        }
    }
    for operand in op.operands() {
        write_operand(operand, out);
        out.push(b' ');
    }
    out.extend_from_slice(op.name().as_bytes());
}

/// Format a real so that it reads back as a real: no exponent, and always
/// with a decimal point.
pub fn format_real(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let mut s = format!("{value}");
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn write_operand(operand: &Operand, out: &mut Vec<u8>) {
    match operand {
        Operand::Integer(i) => out.extend_from_slice(i.to_string().as_bytes()),
        Operand::Real(f) => out.extend_from_slice(format_real(*f).as_bytes()),
        Operand::Name(name) => write_name(name, out),
        Operand::LiteralString(bytes) => write_literal_string(bytes, out),
        Operand::HexString(bytes) => write_hex_string(bytes, out),
        Operand::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_operand(item, out);
            }
            out.push(b']');
        }
        Operand::Boolean(b) => out.extend_from_slice(if *b { b"true" } else { b"false" }),
        Operand::Null => out.extend_from_slice(b"null"),
        Operand::Dictionary(entries) => {
            out.extend_from_slice(b"<<");
            for (key, value) in entries {
                write_name(key, out);
                out.push(b' ');
                write_operand(value, out);
            }
            out.extend_from_slice(b">>");
        }
        Operand::InlineImage(raw) => out.extend_from_slice(raw),
    }
}

fn write_name(name: &[u8], out: &mut Vec<u8>) {
    out.push(b'/');
    for &b in name {
        if b == b'#' || is_whitespace(b) || is_delimiter(b) || !(0x21..=0x7E).contains(&b) {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        } else {
            out.push(b);
        }
    }
}

/// Write a literal string, escaping delimiters and control bytes.
pub(crate) fn write_literal_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'(');
    for &b in bytes {
        match b {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(b);
            }
            0x00..=0x1F | 0x7F => out.extend_from_slice(format!("\\{b:03o}").as_bytes()),
            _ => out.push(b),
        }
    }
    out.push(b')');
}

pub(crate) fn write_hex_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'<');
    for &b in bytes {
        out.extend_from_slice(format!("{b:02X}").as_bytes());
    }
    out.push(b'>');
}
