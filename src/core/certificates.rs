use crate::core::font::{text_width, GlyphMetrics};
use crate::core::overlay::{Template, TextPlacement};
use crate::utils::error::Result;

/// Names from a list file: one per line, trimmed, blank lines dropped and
/// every ".pdf" removed (lists are often pasted from directory listings).
pub fn parse_names(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.replace(".pdf", ""))
        .collect()
}

/// Horizontal origin that centers `text_width` on a page of `page_width`.
/// Wider text yields a negative x and overflows both margins equally.
pub fn centered_x(page_width: f32, text_width: f32) -> f32 {
    (page_width - text_width) / 2.0
}

/// `<prefix><name>.pdf`, with path separators in the name replaced so every
/// certificate lands directly in the output directory.
pub fn certificate_file_name(prefix: &str, name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}{}.pdf", prefix, safe)
}

pub struct CertificateGenerator<F: GlyphMetrics> {
    template: Template,
    font: F,
    font_size: f32,
    y_position: f32,
}

impl<F: GlyphMetrics> CertificateGenerator<F> {
    pub fn new(template: Template, font: F, font_size: f32, y_position: f32) -> Self {
        Self {
            template,
            font,
            font_size,
            y_position,
        }
    }

    /// Centers `name` horizontally on the visible page box; `y_position` is
    /// measured up from the box's bottom edge.
    pub fn placement_for(&self, name: &str) -> Result<TextPlacement> {
        let page_box = self.template.page_box();
        let page_width = page_box.width();
        let width = text_width(&self.font, name, self.font_size)?;
        if width > page_width {
            tracing::warn!(
                "Name '{}' is wider than the page ({:.1} > {:.1}), it will overflow the margins",
                name,
                width,
                page_width
            );
        }

        Ok(TextPlacement {
            x: page_box.left + centered_x(page_width, width),
            y: page_box.bottom + self.y_position,
            font_size: self.font_size,
        })
    }

    /// Renders one certificate as PDF bytes.
    pub fn render(&self, name: &str) -> Result<Vec<u8>> {
        let placement = self.placement_for(name)?;
        tracing::debug!("Placing '{}' at ({:.2}, {:.2})", name, placement.x, placement.y);
        self.template.stamp_to_bytes(&self.font, name, placement)
    }
}
