//! Measurement service – the single source of truth for how tall every
//! layout node is.
//!
//! Placement never computes heights on its own: it asks the [`Measurer`] for
//! the same [`TextRun`] that measurement used, so the space reserved for a
//! block is exactly the space it is drawn into.

use serde::{Deserialize, Serialize};

use crate::fonts::{wrap_text, FontManager};
use crate::plan::{Block, Cell, Row};

/// Width:height ratio of identity-document thumbnails (ID-1 card format).
pub const DOCUMENT_ASPECT: (f32, f32) = (107.0, 67.0);

/// Typographic parameters of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 3],
}

/// Spacing, type and color settings shared by measurement and placement.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    /// Gap added after every unit placed by the cursor.
    pub gap: f32,
    /// Gap between blocks stacked inside one grid cell.
    pub block_gap: f32,
    /// Horizontal gap between grid columns.
    pub column_gap: f32,
    /// Inner padding of a section box.
    pub section_padding: f32,
    /// Vertical space between two sections.
    pub section_spacing: f32,
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: [f32; 3],
    pub line_height: f32,
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub section_title: TextStyle,
    pub label: TextStyle,
    pub value: TextStyle,
    pub emphasis: TextStyle,
    pub header_icon_size: f32,
    pub item_icon_size: f32,
    pub icon_stroke_width: f32,
    pub icon_color: [f32; 3],
    /// Thickness of header rules and list separators.
    pub rule_thickness: f32,
    pub rule_color: [f32; 3],
    /// Width of document thumbnails; height follows [`DOCUMENT_ASPECT`].
    pub thumbnail_width: f32,
    pub placeholder_color: [f32; 3],
}

impl Default for LayoutStyle {
    fn default() -> Self {
        let ink = [0.13, 0.15, 0.19];
        let muted = [0.42, 0.45, 0.50];
        Self {
            gap: 6.0,
            block_gap: 3.0,
            column_gap: 12.0,
            section_padding: 12.0,
            section_spacing: 16.0,
            corner_radius: 6.0,
            border_width: 0.8,
            border_color: [0.82, 0.84, 0.87],
            line_height: 1.2,
            title: TextStyle {
                font_size: 18.0,
                bold: true,
                color: ink,
            },
            subtitle: TextStyle {
                font_size: 9.0,
                bold: false,
                color: muted,
            },
            section_title: TextStyle {
                font_size: 12.0,
                bold: true,
                color: ink,
            },
            label: TextStyle {
                font_size: 8.0,
                bold: false,
                color: muted,
            },
            value: TextStyle {
                font_size: 10.0,
                bold: false,
                color: ink,
            },
            emphasis: TextStyle {
                font_size: 10.0,
                bold: true,
                color: ink,
            },
            header_icon_size: 14.0,
            item_icon_size: 12.0,
            icon_stroke_width: 2.0,
            icon_color: [0.23, 0.40, 0.78],
            rule_thickness: 0.5,
            rule_color: [0.82, 0.84, 0.87],
            thumbnail_width: 160.0,
            placeholder_color: [0.96, 0.96, 0.97],
        }
    }
}

/// A wrapped text run: the lines to draw and the height they occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub lines: Vec<String>,
    pub line_height: f32,
    pub height: f32,
}

/// Computes heights of text runs, blocks, cells and rows.
pub struct Measurer<'a> {
    pub fonts: &'a FontManager,
    pub style: &'a LayoutStyle,
}

impl<'a> Measurer<'a> {
    pub fn new(fonts: &'a FontManager, style: &'a LayoutStyle) -> Self {
        Self { fonts, style }
    }

    /// Wrap `text` into `width` and report its height.
    pub fn text_run(&self, text: &str, style: &TextStyle, width: f32) -> TextRun {
        let lines = wrap_text(text.trim(), style.font_size, style.bold, width, self.fonts);
        let line_height = self.fonts.line_height_px(style.font_size, self.style.line_height);
        let height = lines.len() as f32 * line_height;
        TextRun {
            lines,
            line_height,
            height,
        }
    }

    /// Height of a text run, without keeping its lines.
    pub fn measure(&self, text: &str, style: &TextStyle, width: f32) -> f32 {
        self.text_run(text, style, width).height
    }

    /// Size of a document thumbnail that fits `width`.
    pub fn image_size(&self, width: f32) -> (f32, f32) {
        let w = self.style.thumbnail_width.min(width);
        (w, w * DOCUMENT_ASPECT.1 / DOCUMENT_ASPECT.0)
    }

    /// Height of the rule drawn under a section header or between items.
    pub fn separator_height(&self) -> f32 {
        self.style.rule_thickness
    }

    pub fn block_height(&self, block: &Block, width: f32) -> f32 {
        match block {
            Block::Label { text } => self.measure(text, &self.style.label, width),
            Block::Value { text, emphasis } => {
                let style = if *emphasis {
                    &self.style.emphasis
                } else {
                    &self.style.value
                };
                self.measure(text, style, width)
            }
            // Placeholders reserve the same box as the image they stand in for.
            Block::Image { .. } => self.image_size(width).1,
            Block::Icon { size, .. } => *size,
            Block::Separator => self.separator_height(),
        }
    }

    /// Blocks in a cell stack vertically with `block_gap` between them.
    pub fn cell_height(&self, cell: &Cell) -> f32 {
        let blocks: f32 = cell
            .blocks
            .iter()
            .map(|b| self.block_height(b, cell.width))
            .sum();
        let gaps = cell.blocks.len().saturating_sub(1) as f32 * self.style.block_gap;
        blocks + gaps
    }

    /// A row is as tall as its tallest cell.
    pub fn row_height(&self, row: &Row) -> f32 {
        row.cells
            .iter()
            .map(|c| self.cell_height(c))
            .fold(0.0f32, f32::max)
    }

    /// Height of a section header: icon and title side by side.
    pub fn header_height(&self, title: &str, has_icon: bool, width: f32) -> f32 {
        let text_width = if has_icon {
            width - self.style.header_icon_size - self.style.gap
        } else {
            width
        };
        let text = self.measure(title, &self.style.section_title, text_width);
        if has_icon {
            text.max(self.style.header_icon_size)
        } else {
            text
        }
    }
}
