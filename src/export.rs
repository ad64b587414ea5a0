//! Printable document export
//!
//! The plan is flattened to plain text, word-wrapped by measured width and
//! laid out onto A4 pages. Layout is pure ([`paginate`]); [`render_pdf`]
//! only draws the positioned lines.

use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::{debug, info, instrument};

use crate::error::TripPlannerError;
use crate::formatter::flatten_plain_text;
use crate::Result;

/// Fixed name of the exported document
pub const EXPORT_FILE_NAME: &str = "packing-list.pdf";

/// Text exported when there is no plan
pub const NO_DATA_TEXT: &str = "No data to print";

const DOCUMENT_TITLE: &str = "Packing List";
const LAYER_NAME: &str = "Layer 1";
const POINTS_PER_INCH: f32 = 72.0;
const MM_PER_INCH: f32 = 25.4;

/// Measures rendered text width in millimetres
pub trait TextMeasure {
    fn width_mm(&self, text: &str, font_size_pt: f32) -> f32;
}

/// Glyph advance widths of the standard Helvetica face, in 1/1000 em
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

// ASCII 32 (space) through 126 (~)
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];
const BULLET_WIDTH: u16 = 350;
const DEFAULT_WIDTH: u16 = 556;

impl HelveticaMetrics {
    fn glyph_width(ch: char) -> u16 {
        match ch {
            ' '..='~' => HELVETICA_ASCII[ch as usize - 32],
            '•' => BULLET_WIDTH,
            _ => DEFAULT_WIDTH,
        }
    }
}

impl TextMeasure for HelveticaMetrics {
    fn width_mm(&self, text: &str, font_size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|ch| u32::from(Self::glyph_width(ch))).sum();
        units as f32 / 1000.0 * font_size_pt * MM_PER_INCH / POINTS_PER_INCH
    }
}

/// Page geometry, all lengths in millimetres
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    /// Top and bottom margin
    pub margin: f32,
    pub left_margin: f32,
    pub max_line_width: f32,
    pub line_height: f32,
    pub font_size_pt: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 15.0,
            left_margin: 15.0,
            max_line_width: 180.0,
            line_height: 10.0,
            font_size_pt: 16.0,
        }
    }
}

/// A line with its distance from the top edge of the page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Wrap every paragraph of `text` so no line exceeds the layout width.
///
/// Words wider than a full line are broken between characters.
pub fn wrap_text(text: &str, layout: &PageLayout, measure: &impl TextMeasure) -> Vec<String> {
    let fits = |candidate: &str| measure.width_mm(candidate, layout.font_size_pt) <= layout.max_line_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Lay lines out top to bottom, opening a new page whenever the next line
/// would cross the bottom margin
#[must_use]
pub fn paginate(lines: &[String], layout: &PageLayout) -> Vec<Page> {
    let mut pages = vec![Page::default()];
    let mut cursor = layout.margin;

    for line in lines {
        if cursor + layout.line_height > layout.page_height - layout.margin {
            pages.push(Page::default());
            cursor = layout.margin;
        }
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                text: line.clone(),
                y: cursor,
            });
        }
        cursor += layout.line_height;
    }

    pages
}

/// Draw the pages into PDF bytes
pub fn render_pdf(pages: &[Page], layout: &PageLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        DOCUMENT_TITLE,
        Mm(layout.page_width),
        Mm(layout.page_height),
        LAYER_NAME,
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TripPlannerError::export(format!("Failed to load Helvetica: {e:?}")))?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(layout.page_width), Mm(layout.page_height), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            // PDF y grows upwards from the bottom edge
            layer.use_text(
                line.text.as_str(),
                layout.font_size_pt,
                Mm(layout.left_margin),
                Mm(layout.page_height - line.y),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| TripPlannerError::export(format!("Failed to serialize PDF: {e:?}")))
}

/// Build the document bytes for a plan, or for the no-data placeholder
pub fn plan_document(plan_text: Option<&str>) -> Result<Vec<u8>> {
    let layout = PageLayout::default();
    let plain = match plan_text.map(str::trim) {
        Some(text) if !text.is_empty() => flatten_plain_text(text),
        _ => NO_DATA_TEXT.to_string(),
    };

    let lines = wrap_text(&plain, &layout, &HelveticaMetrics);
    let pages = paginate(&lines, &layout);
    debug!("Laid out {} lines on {} pages", lines.len(), pages.len());
    render_pdf(&pages, &layout)
}

/// Write the plan document to `dir/packing-list.pdf`
#[instrument(skip(plan_text))]
pub fn export_plan(plan_text: Option<&str>, dir: &Path) -> Result<PathBuf> {
    let bytes = plan_document(plan_text)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, bytes)?;
    info!("Exported plan to {}", path.display());
    Ok(path)
}
