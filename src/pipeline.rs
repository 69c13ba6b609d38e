//! Pipeline – ties together asset preparation, mapping, measurement,
//! pagination and rendering into a single function call.

use crate::assets::DocumentAssets;
use crate::cursor::PageGeometry;
use crate::error::Result;
use crate::fonts::FontManager;
use crate::layout_config::LayoutConfig;
use crate::mapper::map_record;
use crate::measure::{LayoutStyle, Measurer};
use crate::pagination::{paginate, SeparatorLookahead};
use crate::record::CustomerRecord;
use crate::render::render_pdf;

/// Default page margin in points.
pub const PAGE_MARGIN_PT: f32 = 40.0;

/// Configuration for one document generation call.
#[derive(Debug, Clone)]
pub struct DocumentConfig {
    /// Document title embedded in the PDF metadata (default: "Customer Detail").
    pub title: String,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 40).
    pub page_margin: f32,
    /// Columns of the profile and document grids (default: 2).
    pub columns: usize,
    pub style: LayoutStyle,
    pub separator_lookahead: SeparatorLookahead,
    /// Optional TrueType faces; the built-in Helvetica pair when `None`.
    pub regular_font: Option<Vec<u8>>,
    pub bold_font: Option<Vec<u8>>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Customer Detail".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            page_margin: PAGE_MARGIN_PT,
            columns: 2,
            style: LayoutStyle::default(),
            separator_lookahead: SeparatorLookahead::default(),
            regular_font: None,
            bold_font: None,
        }
    }
}

impl DocumentConfig {
    pub fn page(&self) -> PageGeometry {
        PageGeometry {
            width: self.page_width,
            height: self.page_height,
            margin: self.page_margin,
        }
    }

    /// Register the configured faces. Failure here is fatal for the call.
    pub fn fonts(&self) -> Result<FontManager> {
        FontManager::from_faces(self.regular_font.as_deref(), self.bold_font.as_deref())
    }
}

/// A finished document: PDF bytes plus the layout they were drawn from.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub layout: LayoutConfig,
}

impl GeneratedDocument {
    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }
}

fn layout_with(
    record: &CustomerRecord,
    assets: &DocumentAssets,
    config: &DocumentConfig,
    fonts: &FontManager,
) -> LayoutConfig {
    let page = config.page();
    let plan = map_record(record, assets, &page, &config.style, config.columns);
    let measurer = Measurer::new(fonts, &config.style);
    let mut layout = paginate(&plan, &page, &measurer, config.separator_lookahead);
    layout.title = config.title.clone();
    layout
}

/// Full pipeline: record → PDF bytes.
pub fn generate_document(
    record: &CustomerRecord,
    config: &DocumentConfig,
) -> Result<GeneratedDocument> {
    record.validate()?;

    // 1. Register fonts (fatal on failure)
    let fonts = config.fonts()?;

    // 2. Resolve image bytes to assets or absence
    let assets = DocumentAssets::prepare(record);

    // 3. Map, measure and paginate
    let layout = layout_with(record, &assets, config, &fonts);

    // 4. Render PDF
    let bytes = render_pdf(&layout, &assets, &fonts)?;
    log::info!(
        "Generated '{}' for record {}: {} page(s), {} bytes",
        layout.title,
        record.id,
        layout.pages.len(),
        bytes.len()
    );

    Ok(GeneratedDocument { bytes, layout })
}

/// Convenience: generate PDF bytes with the default A4 config.
pub fn generate_pdf_from_record(record: &CustomerRecord) -> Result<Vec<u8>> {
    Ok(generate_document(record, &DocumentConfig::default())?.bytes)
}

/// Generate only the layout config (no PDF rendering) – useful for testing.
pub fn compute_layout_config(
    record: &CustomerRecord,
    config: &DocumentConfig,
) -> Result<LayoutConfig> {
    record.validate()?;
    let fonts = config.fonts()?;
    let assets = DocumentAssets::prepare(record);
    Ok(layout_with(record, &assets, config, &fonts))
}
