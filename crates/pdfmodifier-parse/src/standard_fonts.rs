//! Built-in metrics for the standard Type1 fonts.
//!
//! Fonts that rely on the base-14 set usually omit `/Widths`. Widths here
//! are in glyph space (1/1000 em) for the printable ASCII range; codes
//! outside it fall back to a per-family average.

/// Glyph metrics for one standard font.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    /// Canonical PostScript name.
    pub name: &'static str,
    ascii_widths: &'static [u16; 95],
    fallback_width: u16,
    /// Ascent in glyph space units.
    pub ascent: f64,
    /// Descent in glyph space units (negative).
    pub descent: f64,
}

impl StandardFontMetrics {
    /// Advance width for a single-byte code.
    pub fn width(&self, code: u8) -> f64 {
        let w = match code {
            32..=126 => self.ascii_widths[(code - 32) as usize],
            _ => self.fallback_width,
        };
        f64::from(w)
    }
}

const COURIER_WIDTHS: [u16; 95] = [600; 95];

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

const COURIER: StandardFontMetrics = StandardFontMetrics {
    name: "Courier",
    ascii_widths: &COURIER_WIDTHS,
    fallback_width: 600,
    ascent: 629.0,
    descent: -157.0,
};

const HELVETICA: StandardFontMetrics = StandardFontMetrics {
    name: "Helvetica",
    ascii_widths: &HELVETICA_WIDTHS,
    fallback_width: 556,
    ascent: 718.0,
    descent: -207.0,
};

const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    name: "Helvetica-Bold",
    ascii_widths: &HELVETICA_BOLD_WIDTHS,
    fallback_width: 611,
    ascent: 718.0,
    descent: -207.0,
};

const TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    name: "Times-Roman",
    ascii_widths: &TIMES_ROMAN_WIDTHS,
    fallback_width: 500,
    ascent: 683.0,
    descent: -217.0,
};

const TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
    name: "Times-Bold",
    ascii_widths: &TIMES_BOLD_WIDTHS,
    fallback_width: 500,
    ascent: 676.0,
    descent: -205.0,
};

/// Look up metrics for a standard font by its `/BaseFont` name.
///
/// Subset prefixes (`ABCDEF+`) are ignored. Common TrueType aliases
/// (Arial, Times New Roman, Courier New) resolve to their base-14
/// equivalents; oblique and italic faces share the upright widths.
pub fn lookup(base_font: &str) -> Option<StandardFontMetrics> {
    let name = strip_subset_prefix(base_font);
    let normalized: String = name.chars().filter(|c| *c != ' ').collect();
    let (family, style) = match normalized.split_once([',', '-']) {
        Some((family, style)) => (family, style),
        None => (normalized.as_str(), ""),
    };
    let bold = style.contains("Bold");

    match family {
        "Courier" | "CourierNew" | "CourierNewPSMT" => Some(COURIER),
        "Helvetica" | "Arial" | "ArialMT" => Some(if bold { HELVETICA_BOLD } else { HELVETICA }),
        "Times" | "TimesNewRoman" | "TimesNewRomanPSMT" => {
            Some(if bold { TIMES_BOLD } else { TIMES_ROMAN })
        }
        _ => None,
    }
}

/// Strip a six-letter subset tag such as `ABCDEF+`.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_ascii_widths() {
        let m = lookup("Helvetica").unwrap();
        assert_eq!(m.name, "Helvetica");
        assert_eq!(m.width(b' '), 278.0);
        assert_eq!(m.width(b'#'), 556.0);
        assert_eq!(m.width(b'1'), 556.0);
        assert_eq!(m.width(b'I'), 278.0);
        assert_eq!(m.width(b'i'), 222.0);
        assert_eq!(m.width(b'~'), 584.0);
    }

    #[test]
    fn non_ascii_uses_fallback() {
        assert_eq!(lookup("Helvetica").unwrap().width(0xE9), 556.0);
        assert_eq!(lookup("Courier").unwrap().width(0x05), 600.0);
    }

    #[test]
    fn bold_and_oblique_variants() {
        assert_eq!(lookup("Helvetica-Bold").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("Helvetica-Oblique").unwrap().name, "Helvetica");
        assert_eq!(lookup("Helvetica-BoldOblique").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("Times-BoldItalic").unwrap().name, "Times-Bold");
        assert_eq!(lookup("Courier-Bold").unwrap().name, "Courier");
    }

    #[test]
    fn truetype_aliases_and_subsets() {
        assert_eq!(lookup("Arial").unwrap().name, "Helvetica");
        assert_eq!(lookup("Arial,Bold").unwrap().name, "Helvetica-Bold");
        assert_eq!(lookup("ABCDEF+TimesNewRoman").unwrap().name, "Times-Roman");
        assert_eq!(lookup("Courier New").unwrap().name, "Courier");
    }

    #[test]
    fn unknown_font() {
        assert!(lookup("Symbol").is_none());
        assert!(lookup("Gotham-Book").is_none());
    }
}
