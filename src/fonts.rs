//! Font registration and text measurement.
//!
//! Two sources of metrics are supported:
//!
//! - the built-in PDF Helvetica faces, measured with the standard Helvetica
//!   advance-width tables (the same glyphs the renderer draws), and
//! - TrueType faces registered from bytes, measured with `ttf-parser` and
//!   embedded by the renderer.
//!
//! Whichever source is active, the renderer draws with the same face the
//! measurement used, so reserved space always equals drawn space.

use printpdf::{ParsedFont, PdfWarnMsg};

use crate::error::{DocumentError, Result};

/// Advance widths (1/1000 em) of Helvetica for U+0020..=U+007E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Advance widths (1/1000 em) of Helvetica-Bold for U+0020..=U+007E.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Advance widths (1/1000 em) of Helvetica for WinAnsi 0x80..=0xFF.
/// Undefined code points (0x81, 0x8D, 0x8F, 0x90, 0x9D) are never emitted.
const HELVETICA_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // 0xF0
];

/// Advance widths (1/1000 em) of Helvetica-Bold for WinAnsi 0x80..=0xFF.
const HELVETICA_BOLD_HIGH_WIDTHS: [u16; 128] = [
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0, // 0x80
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667, // 0x90
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // 0xA0
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // 0xB0
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // 0xC0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // 0xD0
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // 0xE0
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // 0xF0
];

/// Width used for characters missing from a TrueType face.
const FALLBACK_ADVANCE: f32 = 0.556;

/// WinAnsiEncoding byte the built-in faces draw `c` with; `?` when the
/// character has no WinAnsi glyph.
pub fn winansi_byte(c: char) -> u8 {
    match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        '\u{00A0}' => b' ',
        ' '..='~' | '\u{00A1}'..='\u{00FF}' => c as u8,
        _ => b'?',
    }
}

/// Advance width in 1/1000 em of one WinAnsi byte.
fn builtin_advance(byte: u8, bold: bool) -> u16 {
    let (low, high) = if bold {
        (&HELVETICA_BOLD_WIDTHS, &HELVETICA_BOLD_HIGH_WIDTHS)
    } else {
        (&HELVETICA_WIDTHS, &HELVETICA_HIGH_WIDTHS)
    };
    match byte {
        0x20..=0x7E => low[(byte - 0x20) as usize],
        0x80..=0xFF => high[(byte - 0x80) as usize],
        _ => low[(b'?' - 0x20) as usize],
    }
}

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes; empty for the built-in Helvetica faces.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    /// The face as printpdf parsed it, ready to embed.
    pub parsed: Option<ParsedFont>,
}

impl FontData {
    fn builtin() -> Self {
        // Helvetica AFM ascender.
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
            ascender: 718.0,
            parsed: None,
        }
    }

    /// Parse a TrueType face with both ttf-parser (metrics) and printpdf
    /// (embedding), so a face either backend rejects fails here.
    fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let (units_per_em, ascender) = {
            let face = ttf_parser::Face::parse(&bytes, 0)
                .map_err(|e| DocumentError::Font(format!("failed to parse font: {e}")))?;
            (face.units_per_em() as f32, face.ascender() as f32)
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let parsed = ParsedFont::from_bytes(&bytes, 0, &mut warnings).ok_or_else(|| {
            DocumentError::Font("printpdf could not parse the font for embedding".to_string())
        })?;
        for w in &warnings {
            log::debug!("printpdf font: {w:?}");
        }
        Ok(Self {
            bytes,
            units_per_em,
            ascender,
            parsed: Some(parsed),
        })
    }

    /// True when this face is one of the PDF base-14 Helvetica faces.
    pub fn is_builtin(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Holds the regular and bold faces used by one generation call.
#[derive(Clone)]
pub struct FontManager {
    regular: FontData,
    bold: FontData,
}

impl FontManager {
    /// A manager backed by the built-in Helvetica faces.
    pub fn builtin() -> Self {
        Self {
            regular: FontData::builtin(),
            bold: FontData::builtin(),
        }
    }

    /// Register the faces for a generation call.
    ///
    /// With no bytes the built-in faces are used. A bold face without a
    /// regular one is rejected, and a regular face without a bold one is
    /// used for both weights.
    pub fn from_faces(regular: Option<&[u8]>, bold: Option<&[u8]>) -> Result<Self> {
        let mut mgr = Self::builtin();
        match (regular, bold) {
            (None, None) => {}
            (None, Some(_)) => {
                return Err(DocumentError::Font(
                    "a bold face was supplied without a regular face".to_string(),
                ))
            }
            (Some(r), b) => {
                mgr.load_font(false, r.to_vec())?;
                mgr.load_font(true, b.unwrap_or(r).to_vec())?;
            }
        }
        Ok(mgr)
    }

    /// Load a TTF/OTF font from bytes for one weight.
    pub fn load_font(&mut self, bold: bool, bytes: Vec<u8>) -> Result<()> {
        let data = FontData::from_bytes(bytes)?;
        if bold {
            self.bold = data;
        } else {
            self.regular = data;
        }
        Ok(())
    }

    /// Get font data for a weight.
    pub fn get(&self, bold: bool) -> &FontData {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }

    /// Measure the width of a string at a given font size (in pt).
    ///
    /// Built-in faces are measured per WinAnsi byte, exactly as drawn.
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let data = self.get(bold);

        if data.is_builtin() {
            let units: u32 = text
                .chars()
                .map(|ch| builtin_advance(winansi_byte(ch), bold) as u32)
                .sum();
            return units as f32 / 1000.0 * font_size;
        }

        // Parse the font and sum horizontal advances
        match ttf_parser::Face::parse(&data.bytes, 0) {
            Ok(face) => {
                let scale = font_size / data.units_per_em;
                text.chars()
                    .map(|ch| match face.glyph_index(ch) {
                        Some(gid) => face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale,
                        None => font_size * FALLBACK_ADVANCE,
                    })
                    .sum()
            }
            Err(_) => text.chars().count() as f32 * font_size * FALLBACK_ADVANCE,
        }
    }

    /// Line height in pt.
    pub fn line_height_px(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Ascender in pt for the given weight.
    pub fn ascender_px(&self, font_size: f32, bold: bool) -> f32 {
        let data = self.get(bold);
        data.ascender * font_size / data.units_per_em
    }

    /// True when TrueType faces are registered (and must be embedded).
    pub fn has_real_fonts(&self) -> bool {
        !self.regular.is_builtin()
    }

    /// The printpdf face to embed for a weight; `None` for built-in faces.
    pub fn parsed_face(&self, bold: bool) -> Option<&ParsedFont> {
        self.get(bold).parsed.as_ref()
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
///
/// Words wider than the whole line are broken between characters.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if fonts.measure_text_width(&candidate, font_size, bold) <= max_width {
                current_line = candidate;
                continue;
            }
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
            if fonts.measure_text_width(word, font_size, bold) <= max_width {
                current_line = word.to_string();
            } else {
                for ch in word.chars() {
                    let mut next = current_line.clone();
                    next.push(ch);
                    if !current_line.is_empty()
                        && fonts.measure_text_width(&next, font_size, bold) > max_width
                    {
                        lines.push(std::mem::take(&mut current_line));
                        current_line.push(ch);
                    } else {
                        current_line = next;
                    }
                }
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_text_width_uses_helvetica_table() {
        let mgr = FontManager::default();
        // H(722) e(556) l(222) l(222) o(556) = 2278
        let w = mgr.measure_text_width("Hello", 10.0, false);
        assert!((w - 22.78).abs() < 0.01, "got {w}");
    }

    #[test]
    fn bold_is_wider() {
        let mgr = FontManager::default();
        let regular = mgr.measure_text_width("Jakarta Selatan", 10.0, false);
        let bold = mgr.measure_text_width("Jakarta Selatan", 10.0, true);
        assert!(bold > regular);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::default();
        let lines = wrap_text("Hello world foo bar", 16.0, false, 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn overlong_word_is_broken() {
        let mgr = FontManager::default();
        let lines = wrap_text("averyveryverylongemailaddress@example.com", 10.0, false, 50.0, &mgr);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, false) <= 50.0, "{line:?} too wide");
        }
    }

    #[test]
    fn explicit_newlines_are_kept() {
        let mgr = FontManager::default();
        let lines = wrap_text("one\ntwo", 10.0, false, 500.0, &mgr);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let err = FontManager::from_faces(Some(b"not a font"), None);
        assert!(matches!(err, Err(DocumentError::Font(_))));
    }

    #[test]
    fn latin1_and_punctuation_use_helvetica_widths() {
        let mgr = FontManager::default();
        // U-dieresis 722, i-dieresis 278, emdash 1000
        assert!((mgr.measure_text_width("\u{00DC}", 10.0, false) - 7.22).abs() < 0.01);
        assert!((mgr.measure_text_width("\u{00EF}", 10.0, false) - 2.78).abs() < 0.01);
        assert!((mgr.measure_text_width("\u{2014}", 10.0, false) - 10.0).abs() < 0.01);
        // e-acute bold 556, n-tilde bold 611
        assert!((mgr.measure_text_width("\u{00E9}\u{00F1}", 10.0, true) - 11.67).abs() < 0.01);
    }

    #[test]
    fn unmappable_characters_measure_as_question_mark() {
        let mgr = FontManager::default();
        let cjk = mgr.measure_text_width("\u{4E16}", 10.0, false);
        assert_eq!(cjk, mgr.measure_text_width("?", 10.0, false));
        assert_eq!(winansi_byte('\u{4E16}'), b'?');
        assert_eq!(winansi_byte('\u{0085}'), b'?');
    }

    #[test]
    fn accented_words_wrap_within_width() {
        let mgr = FontManager::default();
        let lines = wrap_text(&"\u{00DC}".repeat(9), 10.0, false, 50.0, &mgr);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, false) <= 50.0, "{line:?} too wide");
        }
        let name = "J\u{00FC}rgen M\u{00FC}ller-\u{00C5}str\u{00F6}m";
        let lines = wrap_text(name, 10.0, true, 60.0, &mgr);
        for line in &lines {
            assert!(mgr.measure_text_width(line, 10.0, true) <= 60.0, "{line:?} too wide");
        }
    }

    #[test]
    fn builtin_faces_have_nothing_to_embed() {
        let mgr = FontManager::default();
        assert!(!mgr.has_real_fonts());
        assert!(mgr.parsed_face(false).is_none());
        assert!(mgr.parsed_face(true).is_none());
    }

    #[test]
    fn bold_without_regular_is_rejected() {
        let err = FontManager::from_faces(None, Some(b"x"));
        assert!(matches!(err, Err(DocumentError::Font(_))));
    }
}
