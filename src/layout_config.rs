//! Layout config – the intermediate representation between pagination and
//! PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page, in page coordinates (origin top-left, points).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::icons::IconKind;
use crate::plan::ImageSlot;

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    /// Draw list in paint order.
    pub elements: Vec<Element>,
    /// One entry per section box drawn on this page.
    #[serde(default)]
    pub segments: Vec<SectionSegment>,
    /// List items placed on this page.
    #[serde(default)]
    pub items: Vec<PlacedItem>,
}

/// The part of a section that landed on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSegment {
    pub title: String,
    pub top: f32,
    pub bottom: f32,
    /// True when the section started on an earlier page.
    pub continuation: bool,
}

/// Vertical extent of one repeating-list item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub section: String,
    pub index: usize,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleRole {
    /// Under a section header (also on continuation pages).
    Header,
    /// Between two list items.
    ItemSeparator,
}

/// A single drawable thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Frame(FrameElement),
    Rule(RuleElement),
    Icon(IconElement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    /// Pre-wrapped lines of text.
    pub lines: Vec<String>,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 3],
    pub line_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub slot: ImageSlot,
}

/// A rounded rectangle: section boxes and image placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameElement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub radius: f32,
    pub stroke_width: f32,
    pub stroke_color: [f32; 3],
    pub fill_color: Option<[f32; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleElement {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub thickness: f32,
    pub color: [f32; 3],
    pub role: RuleRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconElement {
    pub kind: IconKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [f32; 3],
    pub stroke_width: f32,
}

impl LayoutConfig {
    /// Create an empty A4 layout config.
    pub fn a4() -> Self {
        Self {
            title: Self::default_title(),
            // A4: 210mm × 297mm = 595.28 × 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    fn default_title() -> String {
        "Customer Detail".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All list items across pages, in placement order.
    pub fn placed_items(&self) -> impl Iterator<Item = (usize, &PlacedItem)> {
        self.pages
            .iter()
            .flat_map(|p| p.items.iter().map(move |i| (p.page_index, i)))
    }
}

impl PageLayout {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            elements: Vec::new(),
            segments: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Rules with the given role on this page.
    pub fn rules(&self, role: RuleRole) -> impl Iterator<Item = &RuleElement> {
        self.elements.iter().filter_map(move |e| match e {
            Element::Rule(r) if r.role == role => Some(r),
            _ => None,
        })
    }

    /// Text lines on this page, joined per element.
    pub fn texts(&self) -> impl Iterator<Item = String> + '_ {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t.lines.join(" ")),
            _ => None,
        })
    }

    pub fn segment(&self, title: &str) -> Option<&SectionSegment> {
        self.segments.iter().find(|s| s.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_keeps_tagged_elements() {
        let mut config = LayoutConfig::a4();
        let mut page = PageLayout::new(0);
        page.elements.push(Element::Rule(RuleElement {
            x1: 40.0,
            x2: 100.0,
            y: 50.0,
            thickness: 0.5,
            color: [0.0, 0.0, 0.0],
            role: RuleRole::ItemSeparator,
        }));
        page.elements.push(Element::Icon(IconElement {
            kind: IconKind::Pin,
            x: 40.0,
            y: 60.0,
            size: 12.0,
            color: [0.0, 0.0, 1.0],
            stroke_width: 2.0,
        }));
        config.pages.push(page);

        let json = config.to_json().unwrap();
        assert!(json.contains("\"type\": \"rule\""));
        assert!(json.contains("\"item_separator\""));
        let back = LayoutConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.pages[0].rules(RuleRole::ItemSeparator).count(), 1);
        assert_eq!(back.pages[0].rules(RuleRole::Header).count(), 0);
    }
}
