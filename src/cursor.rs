//! Layout cursor and box renderer.
//!
//! [`Placer`] turns measured blocks into page [`Element`]s at the cursor
//! position and reports the height it used; the caller advances the cursor.
//! Section boxes are emitted by [`Placer::close_section`] once a page
//! segment's content is complete.

use crate::icons::IconKind;
use crate::layout_config::{
    Element, FrameElement, IconElement, ImageElement, RuleElement, RuleRole, TextElement,
};
use crate::measure::{Measurer, TextStyle};
use crate::plan::{Block, Cell, ImageSource, Row};

/// Fixed page size and margin with the derived printable bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub fn a4(margin: f32) -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin,
        }
    }

    pub fn printable_top(&self) -> f32 {
        self.margin
    }

    pub fn printable_bottom(&self) -> f32 {
        self.height - self.margin
    }

    pub fn printable_left(&self) -> f32 {
        self.margin
    }

    pub fn printable_right(&self) -> f32 {
        self.width - self.margin
    }

    pub fn content_width(&self) -> f32 {
        self.printable_right() - self.printable_left()
    }

    /// Width of one grid column inside a padded section box.
    pub fn column_width(&self, columns: usize, padding: f32, column_gap: f32) -> f32 {
        let columns = columns.max(1);
        let inner = self.content_width() - 2.0 * padding;
        (inner - column_gap * (columns - 1) as f32) / columns as f32
    }
}

/// The write position of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
}

impl Cursor {
    pub fn top_of(page: &PageGeometry) -> Self {
        Self {
            x: page.printable_left(),
            y: page.printable_top(),
        }
    }

    /// Move past a placed unit of height `height`.
    pub fn advance(&mut self, height: f32, gap: f32) {
        debug_assert!(height >= 0.0 && gap >= 0.0);
        self.y += height + gap;
    }
}

/// Draws blocks at the cursor using the measurer's metrics.
pub struct Placer<'a> {
    pub measurer: &'a Measurer<'a>,
}

impl<'a> Placer<'a> {
    pub fn new(measurer: &'a Measurer<'a>) -> Self {
        Self { measurer }
    }

    /// Draw `text` with its top-left at `(x, y)`; returns the height used.
    pub fn place_text(
        &self,
        out: &mut Vec<Element>,
        text: &str,
        style: &TextStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> f32 {
        let run = self.measurer.text_run(text, style, width);
        out.push(Element::Text(TextElement {
            x,
            y,
            width,
            lines: run.lines,
            font_size: style.font_size,
            bold: style.bold,
            color: style.color,
            line_height: run.line_height,
        }));
        run.height
    }

    /// Draw one block at `cursor` within `width`; returns its measured height.
    pub fn place(&self, out: &mut Vec<Element>, block: &Block, cursor: Cursor, width: f32) -> f32 {
        let style = self.measurer.style;
        match block {
            Block::Label { text } => {
                self.place_text(out, text, &style.label, cursor.x, cursor.y, width)
            }
            Block::Value { text, emphasis } => {
                let ts = if *emphasis { &style.emphasis } else { &style.value };
                self.place_text(out, text, ts, cursor.x, cursor.y, width)
            }
            Block::Image { source } => {
                let (w, h) = self.measurer.image_size(width);
                match source {
                    ImageSource::Asset(slot) => out.push(Element::Image(ImageElement {
                        x: cursor.x,
                        y: cursor.y,
                        width: w,
                        height: h,
                        slot: *slot,
                    })),
                    ImageSource::Placeholder(caption) => {
                        out.push(Element::Frame(FrameElement {
                            x: cursor.x,
                            y: cursor.y,
                            width: w,
                            height: h,
                            radius: style.corner_radius,
                            stroke_width: style.border_width,
                            stroke_color: style.border_color,
                            fill_color: Some(style.placeholder_color),
                        }));
                        let caption_h = self.measurer.measure(caption, &style.label, w);
                        self.place_text(
                            out,
                            caption,
                            &style.label,
                            cursor.x + style.gap,
                            cursor.y + (h - caption_h) / 2.0,
                            w - 2.0 * style.gap,
                        );
                    }
                }
                h
            }
            Block::Icon { kind, size } => {
                out.push(Element::Icon(IconElement {
                    kind: *kind,
                    x: cursor.x,
                    y: cursor.y,
                    size: *size,
                    color: style.icon_color,
                    stroke_width: style.icon_stroke_width,
                }));
                *size
            }
            Block::Separator => {
                let h = self.measurer.separator_height();
                out.push(Element::Rule(RuleElement {
                    x1: cursor.x,
                    x2: cursor.x + width,
                    y: cursor.y + h / 2.0,
                    thickness: h,
                    color: style.rule_color,
                    role: RuleRole::ItemSeparator,
                }));
                h
            }
        }
    }

    /// Stack a cell's blocks starting at `origin` offset by the cell's x.
    pub fn place_cell(&self, out: &mut Vec<Element>, cell: &Cell, origin: Cursor) -> f32 {
        let gap = self.measurer.style.block_gap;
        let mut cursor = Cursor {
            x: origin.x + cell.x_offset,
            y: origin.y,
        };
        for (i, block) in cell.blocks.iter().enumerate() {
            if i > 0 {
                cursor.y += gap;
            }
            cursor.y += self.place(out, block, cursor, cell.width);
        }
        cursor.y - origin.y
    }

    /// Draw every cell of a row; returns the row's measured height.
    pub fn place_row(&self, out: &mut Vec<Element>, row: &Row, origin: Cursor) -> f32 {
        for cell in &row.cells {
            self.place_cell(out, cell, origin);
        }
        self.measurer.row_height(row)
    }

    /// Section header: optional icon, bold title, then the header rule.
    /// Returns the height consumed, including the gaps after title and rule.
    pub fn place_header(
        &self,
        out: &mut Vec<Element>,
        title: &str,
        icon: Option<IconKind>,
        origin: Cursor,
        width: f32,
    ) -> f32 {
        let style = self.measurer.style;
        let header_h = self.measurer.header_height(title, icon.is_some(), width);
        let mut text_x = origin.x;
        if let Some(kind) = icon {
            let size = style.header_icon_size;
            self.place(
                out,
                &Block::Icon { kind, size },
                Cursor {
                    x: origin.x,
                    y: origin.y + (header_h - size) / 2.0,
                },
                size,
            );
            text_x += size + style.gap;
        }
        let text_w = origin.x + width - text_x;
        let text_h = self.measurer.measure(title, &style.section_title, text_w);
        self.place_text(
            out,
            title,
            &style.section_title,
            text_x,
            origin.y + (header_h - text_h) / 2.0,
            text_w,
        );

        let rule_y = origin.y + header_h + style.gap;
        let rule_h = self.measurer.separator_height();
        out.push(Element::Rule(RuleElement {
            x1: origin.x,
            x2: origin.x + width,
            y: rule_y + rule_h / 2.0,
            thickness: rule_h,
            color: style.rule_color,
            role: RuleRole::Header,
        }));
        header_h + style.gap + rule_h + style.gap
    }

    /// Height [`Placer::place_header`] will consume.
    pub fn header_extent(&self, title: &str, has_icon: bool, width: f32) -> f32 {
        let style = self.measurer.style;
        self.measurer.header_height(title, has_icon, width)
            + style.gap
            + self.measurer.separator_height()
            + style.gap
    }

    /// Draw the rounded box of one section segment: from `start_y` to the
    /// end cursor plus padding. Returns the box height.
    pub fn close_section(
        &self,
        out: &mut Vec<Element>,
        page: &PageGeometry,
        start_y: f32,
        end: Cursor,
    ) -> f32 {
        let style = self.measurer.style;
        let height = end.y - start_y + style.section_padding;
        out.push(Element::Frame(FrameElement {
            x: page.printable_left(),
            y: start_y,
            width: page.content_width(),
            height,
            radius: style.corner_radius,
            stroke_width: style.border_width,
            stroke_color: style.border_color,
            fill_color: None,
        }));
        height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;
    use crate::icons::IconKind;
    use crate::measure::LayoutStyle;

    #[test]
    fn printable_bounds() {
        let page = PageGeometry::a4(40.0);
        assert_eq!(page.printable_top(), 40.0);
        assert!((page.printable_bottom() - 801.89).abs() < 1e-3);
        assert!((page.content_width() - 515.28).abs() < 1e-3);
        let col = page.column_width(2, 12.0, 12.0);
        assert!((col - (515.28 - 24.0 - 12.0) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn placed_height_equals_measured_height() {
        let fonts = FontManager::default();
        let style = LayoutStyle::default();
        let m = Measurer::new(&fonts, &style);
        let placer = Placer::new(&m);
        let blocks = [
            Block::Label { text: "Email".into() },
            Block::Value {
                text: "A long value that wraps over several lines at this narrow width".into(),
                emphasis: true,
            },
            Block::Image {
                source: ImageSource::Placeholder("No image uploaded".into()),
            },
            Block::Icon {
                kind: IconKind::Map,
                size: 14.0,
            },
            Block::Separator,
        ];
        for block in &blocks {
            let mut out = Vec::new();
            let placed = placer.place(&mut out, block, Cursor { x: 0.0, y: 0.0 }, 120.0);
            assert_eq!(placed, m.block_height(block, 120.0), "{block:?}");
            assert!(!out.is_empty());
        }
    }

    #[test]
    fn header_extent_matches_placement() {
        let fonts = FontManager::default();
        let style = LayoutStyle::default();
        let m = Measurer::new(&fonts, &style);
        let placer = Placer::new(&m);
        let mut out = Vec::new();
        let used = placer.place_header(
            &mut out,
            "List Address",
            Some(IconKind::Map),
            Cursor { x: 52.0, y: 100.0 },
            491.28,
        );
        assert_eq!(used, placer.header_extent("List Address", true, 491.28));
        // icon, title, rule
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn section_box_spans_start_to_cursor_plus_padding() {
        let fonts = FontManager::default();
        let style = LayoutStyle::default();
        let m = Measurer::new(&fonts, &style);
        let placer = Placer::new(&m);
        let page = PageGeometry::a4(40.0);
        let mut out = Vec::new();
        let h = placer.close_section(&mut out, &page, 100.0, Cursor { x: 40.0, y: 250.0 });
        assert_eq!(h, 150.0 + style.section_padding);
        match &out[0] {
            Element::Frame(f) => {
                assert_eq!(f.y, 100.0);
                assert_eq!(f.height, h);
            }
            other => panic!("expected frame, got {other:?}"),
        }
    }
}
