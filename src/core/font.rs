//! Font metrics for measuring and embedding the certificate name.

use crate::utils::error::{CrawlError, Result};
use std::path::Path;
use ttf_parser::{name_id, Face};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub id: u16,
    /// Horizontal advance in font units.
    pub advance: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlineKind {
    TrueType,
    Cff,
}

/// What the overlay needs from a font: per-character glyphs and advances,
/// global metrics for the font descriptor, and the raw program to embed.
pub trait GlyphMetrics {
    fn postscript_name(&self) -> &str;
    fn units_per_em(&self) -> u16;
    fn glyph(&self, c: char) -> Option<Glyph>;
    fn ascent(&self) -> i16;
    fn descent(&self) -> i16;
    /// `[x_min, y_min, x_max, y_max]` in font units.
    fn bbox(&self) -> [i16; 4];
    fn outline_kind(&self) -> OutlineKind;
    fn program(&self) -> &[u8];
}

/// Maps `text` to glyphs, skipping control characters. A printable character
/// without a glyph is an error.
pub fn shape<F: GlyphMetrics + ?Sized>(font: &F, text: &str) -> Result<Vec<(char, Glyph)>> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| {
            font.glyph(c)
                .map(|glyph| (c, glyph))
                .ok_or_else(|| CrawlError::MissingGlyphError {
                    character: c,
                    text: text.to_string(),
                })
        })
        .collect()
}

/// Rendered width of `text` at `font_size`, in the same units as the size.
pub fn text_width<F: GlyphMetrics + ?Sized>(font: &F, text: &str, font_size: f32) -> Result<f32> {
    let units: u32 = shape(font, text)?
        .iter()
        .map(|(_, glyph)| u32::from(glyph.advance))
        .sum();
    Ok(units as f32 * font_size / f32::from(font.units_per_em()))
}

/// A TrueType/OpenType font file held in memory.
pub struct TrueTypeFont {
    data: Vec<u8>,
    postscript_name: String,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    bbox: [i16; 4],
    outline_kind: OutlineKind,
}

impl TrueTypeFont {
    /// Parses a font file held in memory. `label` names the file in errors,
    /// and its stem stands in for a missing PostScript name.
    pub fn from_bytes(data: Vec<u8>, label: &str) -> Result<Self> {
        let face = Face::parse(&data, 0).map_err(|e| CrawlError::FontError {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        let fallback_name = Path::new(label)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Font");

        let raw_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .unwrap_or_else(|| fallback_name.to_string());
        let rect = face.global_bounding_box();
        let outline_kind = if face.tables().cff.is_some() {
            OutlineKind::Cff
        } else {
            OutlineKind::TrueType
        };
        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let descent = face.descender();
        drop(face);

        Ok(Self {
            data,
            postscript_name: pdf_safe_name(&raw_name),
            units_per_em,
            ascent,
            descent,
            bbox: [rect.x_min, rect.y_min, rect.x_max, rect.y_max],
            outline_kind,
        })
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, 0).ok()
    }
}

impl GlyphMetrics for TrueTypeFont {
    fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn glyph(&self, c: char) -> Option<Glyph> {
        let face = self.face()?;
        let id = face.glyph_index(c)?;
        // .notdef is not a real glyph for our purposes
        if id.0 == 0 {
            return None;
        }
        Some(Glyph {
            id: id.0,
            advance: face.glyph_hor_advance(id).unwrap_or(0),
        })
    }

    fn ascent(&self) -> i16 {
        self.ascent
    }

    fn descent(&self) -> i16 {
        self.descent
    }

    fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    fn outline_kind(&self) -> OutlineKind {
        self.outline_kind
    }

    fn program(&self) -> &[u8] {
        &self.data
    }
}

/// PDF names cannot hold whitespace or delimiters.
fn pdf_safe_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
        .collect();
    if cleaned.is_empty() {
        "Font".to_string()
    } else {
        cleaned
    }
}
