//! Document plan – the retained layout tree produced by the mapper and
//! consumed by the pagination controller.
//!
//! Nothing here knows about pages: a plan is a sequence of sections made of
//! rows, rows are made of side-by-side cells, and cells stack blocks.

use serde::{Deserialize, Serialize};

use crate::icons::IconKind;

/// The two image slots a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    IdentityDocument,
    SecondaryDocument,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// A prepared asset is available for this slot.
    Asset(ImageSlot),
    /// No asset: draw a framed placeholder carrying this caption.
    Placeholder(String),
}

/// The smallest measured unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Label { text: String },
    Value { text: String, emphasis: bool },
    Image { source: ImageSource },
    Icon { kind: IconKind, size: f32 },
    Separator,
}

/// A vertical stack of blocks at a fixed horizontal offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Offset from the section's content-left edge.
    pub x_offset: f32,
    pub width: f32,
    pub blocks: Vec<Block>,
}

/// Cells placed side by side; never split across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    /// Label/value grid rows.
    Grid(Vec<Row>),
    /// A repeating list: one row per item, separated by rules.
    List { items: Vec<Row>, empty_text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub icon: Option<IconKind>,
    pub body: SectionBody,
}

impl Section {
    /// Units the pagination controller places one at a time.
    pub fn rows(&self) -> &[Row] {
        match &self.body {
            SectionBody::Grid(rows) => rows,
            SectionBody::List { items, .. } => items,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.body, SectionBody::List { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan {
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
}
