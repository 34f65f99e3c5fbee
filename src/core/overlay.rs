//! Stamping a line of text onto the first page of a template PDF.
//!
//! The template is trimmed to its first page once, then cloned per output.
//! The page's own content is wrapped in `q`/`Q` so whatever graphics state it
//! leaves behind cannot leak into the appended text, and the font is embedded
//! as a Type0 font addressed by glyph id (Identity-H), which covers every
//! glyph in the font regardless of script.

use crate::core::font::{shape, Glyph, GlyphMetrics, OutlineKind};
use crate::utils::error::{CrawlError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;

/// US-Letter in points, used when a page declares no box at all.
pub const LETTER_BOX: PageBox = PageBox {
    left: 0.0,
    bottom: 0.0,
    right: 612.0,
    top: 792.0,
};

const FONT_RESOURCE_PREFIX: &str = "FCert";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

/// Visible page rectangle in default user space, normalised so that
/// `left <= right` and `bottom <= top`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl PageBox {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

pub struct Template {
    doc: Document,
    page_id: ObjectId,
    page_box: PageBox,
}

impl Template {
    pub fn from_bytes(bytes: &[u8], label: &str) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| CrawlError::TemplateError {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        Self::from_document(doc, label)
    }

    pub fn from_document(mut doc: Document, label: &str) -> Result<Self> {
        let pages = doc.get_pages();
        let Some((&first_number, &page_id)) = pages.iter().next() else {
            return Err(CrawlError::TemplateError {
                path: label.to_string(),
                message: "document has no pages".to_string(),
            });
        };

        let extra: Vec<u32> = pages.keys().copied().filter(|n| *n != first_number).collect();
        if !extra.is_empty() {
            tracing::debug!("Template {} has {} extra page(s), keeping page 1", label, extra.len());
            doc.delete_pages(&extra);
            doc.prune_objects();
        }

        let page_box = page_box(&doc, page_id)?;
        if let Some(rotate) = inherited(&doc, page_id, b"Rotate")?.and_then(|r| r.as_i64().ok()) {
            if rotate.rem_euclid(360) != 0 {
                tracing::warn!(
                    "Template {} is rotated by {} degrees, text is placed in unrotated page space",
                    label,
                    rotate
                );
            }
        }
        Ok(Self {
            doc,
            page_id,
            page_box,
        })
    }

    pub fn page_box(&self) -> PageBox {
        self.page_box
    }

    pub fn page_width(&self) -> f32 {
        self.page_box.width()
    }

    /// Returns a fresh single-page document with `text` drawn at `placement`.
    pub fn stamp<F: GlyphMetrics + ?Sized>(
        &self,
        font: &F,
        text: &str,
        placement: TextPlacement,
    ) -> Result<Document> {
        let glyphs = shape(font, text)?;
        let mut doc = self.doc.clone();

        let font_id = embed_font(&mut doc, font, &glyphs)?;
        let resource_name = register_font(&mut doc, self.page_id, font_id)?;

        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let text_id = doc.add_object(Stream::new(
            Dictionary::new(),
            text_content(&resource_name, &glyphs, placement)?,
        ));
        wrap_page_contents(&mut doc, self.page_id, open_id, text_id)?;

        Ok(doc)
    }

    /// Like [`Template::stamp`], serialized to bytes.
    pub fn stamp_to_bytes<F: GlyphMetrics + ?Sized>(
        &self,
        font: &F,
        text: &str,
        placement: TextPlacement,
    ) -> Result<Vec<u8>> {
        let mut doc = self.stamp(font, text, placement)?;
        doc.compress();
        let mut output = Vec::new();
        doc.save_to(&mut output)?;
        Ok(output)
    }
}

/// Looks up `key` on the page, then up the page tree (inheritable attributes).
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Result<Option<&'a Object>> {
    let mut node = page_id;
    loop {
        let dict = doc.get_dictionary(node)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = parent,
            Err(_) => return Ok(None),
        }
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// CropBox when present (the region viewers show), else MediaBox, both
/// inheritable; US-Letter when the page declares neither.
fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let declared = match inherited(doc, page_id, b"CropBox")? {
        Some(crop_box) => Some(crop_box),
        None => inherited(doc, page_id, b"MediaBox")?,
    };
    let Some(rect) = declared else {
        return Ok(LETTER_BOX);
    };

    let corners = rect
        .as_array()?
        .iter()
        .map(|v| resolve(doc, v).and_then(|v| Ok(v.as_float()?)))
        .collect::<Result<Vec<f32>>>()?;
    match corners.as_slice() {
        [x0, y0, x1, y1] => Ok(PageBox {
            left: x0.min(*x1),
            bottom: y0.min(*y1),
            right: x0.max(*x1),
            top: y0.max(*y1),
        }),
        _ => Err(CrawlError::TemplateError {
            path: format!("page {:?}", page_id),
            message: format!("page box has {} entries", corners.len()),
        }),
    }
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn glyph_hex(glyphs: &[(char, Glyph)]) -> Vec<u8> {
    glyphs
        .iter()
        .flat_map(|(_, glyph)| glyph.id.to_be_bytes())
        .collect()
}

fn scale<F: GlyphMetrics + ?Sized>(font: &F, units: i32) -> i64 {
    (i64::from(units) * 1000) / i64::from(font.units_per_em().max(1))
}

/// Adds the Type0 font, its descendant CIDFont, descriptor, program and
/// ToUnicode map; returns the Type0 font object.
fn embed_font<F: GlyphMetrics + ?Sized>(
    doc: &mut Document,
    font: &F,
    glyphs: &[(char, Glyph)],
) -> Result<ObjectId> {
    let program = font.program().to_vec();
    let program_len = program.len() as i64;
    let (file_key, cid_subtype) = match font.outline_kind() {
        OutlineKind::TrueType => ("FontFile2", "CIDFontType2"),
        OutlineKind::Cff => ("FontFile3", "CIDFontType0"),
    };
    let mut file_dict = Dictionary::new();
    match font.outline_kind() {
        OutlineKind::TrueType => file_dict.set("Length1", Object::Integer(program_len)),
        OutlineKind::Cff => file_dict.set("Subtype", name("OpenType")),
    }
    let file_id = doc.add_object(Stream::new(file_dict, program));

    let [x_min, y_min, x_max, y_max] = font.bbox();
    let ascent = scale(font, i32::from(font.ascent()));
    let descriptor = Dictionary::from_iter(vec![
        ("Type", name("FontDescriptor")),
        ("FontName", name(font.postscript_name())),
        ("Flags", Object::Integer(32)),
        (
            "FontBBox",
            Object::Array(
                [x_min, y_min, x_max, y_max]
                    .iter()
                    .map(|v| Object::Integer(scale(font, i32::from(*v))))
                    .collect(),
            ),
        ),
        ("ItalicAngle", Object::Integer(0)),
        ("Ascent", Object::Integer(ascent)),
        ("Descent", Object::Integer(scale(font, i32::from(font.descent())))),
        ("CapHeight", Object::Integer(ascent)),
        ("StemV", Object::Integer(80)),
        (file_key, Object::Reference(file_id)),
    ]);
    let descriptor_id = doc.add_object(descriptor);

    // One W entry per distinct glyph: [gid [width]]
    let widths: BTreeMap<u16, u16> = glyphs.iter().map(|(_, g)| (g.id, g.advance)).collect();
    let mut w_array = Vec::with_capacity(widths.len() * 2);
    for (id, advance) in &widths {
        w_array.push(Object::Integer(i64::from(*id)));
        w_array.push(Object::Array(vec![Object::Integer(scale(
            font,
            i32::from(*advance),
        ))]));
    }

    let mut cid_font = Dictionary::from_iter(vec![
        ("Type", name("Font")),
        ("Subtype", name(cid_subtype)),
        ("BaseFont", name(font.postscript_name())),
        (
            "CIDSystemInfo",
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Registry", Object::string_literal("Adobe")),
                ("Ordering", Object::string_literal("Identity")),
                ("Supplement", Object::Integer(0)),
            ])),
        ),
        ("FontDescriptor", Object::Reference(descriptor_id)),
        ("DW", Object::Integer(1000)),
        ("W", Object::Array(w_array)),
    ]);
    if font.outline_kind() == OutlineKind::TrueType {
        cid_font.set("CIDToGIDMap", name("Identity"));
    }
    let cid_font_id = doc.add_object(cid_font);

    let to_unicode_id = doc.add_object(Stream::new(
        Dictionary::new(),
        to_unicode_cmap(glyphs).into_bytes(),
    ));

    let type0 = Dictionary::from_iter(vec![
        ("Type", name("Font")),
        ("Subtype", name("Type0")),
        ("BaseFont", name(font.postscript_name())),
        ("Encoding", name("Identity-H")),
        (
            "DescendantFonts",
            Object::Array(vec![Object::Reference(cid_font_id)]),
        ),
        ("ToUnicode", Object::Reference(to_unicode_id)),
    ]);
    Ok(doc.add_object(type0))
}

fn to_unicode_cmap(glyphs: &[(char, Glyph)]) -> String {
    let mapping: BTreeMap<u16, char> = glyphs.iter().map(|(c, g)| (g.id, *c)).collect();

    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
    );

    let entries: Vec<(u16, char)> = mapping.into_iter().collect();
    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (id, c) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", id, utf16));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
    cmap
}

fn text_content(
    resource_name: &str,
    glyphs: &[(char, Glyph)],
    placement: TextPlacement,
) -> Result<Vec<u8>> {
    let content = Content {
        operations: vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("g", vec![Object::Integer(0)]),
            Operation::new(
                "Tf",
                vec![name(resource_name), Object::Real(placement.font_size)],
            ),
            Operation::new(
                "Td",
                vec![Object::Real(placement.x), Object::Real(placement.y)],
            ),
            Operation::new(
                "Tj",
                vec![Object::String(glyph_hex(glyphs), StringFormat::Hexadecimal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ],
    };
    Ok(content.encode()?)
}

/// Copies the page's effective resources onto the page itself and adds the
/// font under a name not already taken. Returns that name.
fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<String> {
    let mut resources = match inherited(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let mut fonts = match resources.get(b"Font").map(|f| resolve(doc, f)) {
        Ok(Ok(Object::Dictionary(dict))) => dict.clone(),
        _ => Dictionary::new(),
    };

    let mut resource_name = FONT_RESOURCE_PREFIX.to_string();
    let mut suffix = 1;
    while fonts.has(resource_name.as_bytes()) {
        suffix += 1;
        resource_name = format!("{}{}", FONT_RESOURCE_PREFIX, suffix);
    }

    fonts.set(resource_name.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));

    Ok(resource_name)
}

/// Contents becomes `[open, <original streams...>, text]`.
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    open_id: ObjectId,
    text_id: ObjectId,
) -> Result<()> {
    let existing: Vec<Object> = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match doc.get_object(*id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(text_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
