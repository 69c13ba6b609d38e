//! Record-to-layout mapper – walks a [`CustomerRecord`] and builds the
//! [`DocumentPlan`] the pagination controller consumes.
//!
//! Pure: no measurement, no drawing. Column geometry is fixed here so the
//! plan is complete before any height is asked for.

use crate::assets::DocumentAssets;
use crate::cursor::PageGeometry;
use crate::icons::IconKind;
use crate::measure::LayoutStyle;
use crate::plan::{Block, Cell, DocumentPlan, ImageSlot, ImageSource, Row, Section, SectionBody};
use crate::record::{Address, CustomerRecord, Role};

pub const PROFILE_TITLE: &str = "Profile";
pub const DOCUMENTS_TITLE: &str = "Documents";
pub const ADDRESSES_TITLE: &str = "List Address";
pub const EMPTY_ADDRESSES: &str = "No address registered";
const MISSING_VALUE: &str = "-";
const MISSING_IMAGE: &str = "No document uploaded";

/// Grid settings the mapper lays cells out with.
#[derive(Debug, Clone, Copy)]
pub struct GridColumns {
    pub columns: usize,
    pub column_width: f32,
    pub column_gap: f32,
    /// Width inside a section box's padding.
    pub inner_width: f32,
}

impl GridColumns {
    pub fn new(page: &PageGeometry, style: &LayoutStyle, columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            column_width: page.column_width(columns, style.section_padding, style.column_gap),
            column_gap: style.column_gap,
            inner_width: page.content_width() - 2.0 * style.section_padding,
        }
    }

    fn column_x(&self, column: usize) -> f32 {
        column as f32 * (self.column_width + self.column_gap)
    }

    /// Lay stacks of blocks out left-to-right, `columns` per row.
    fn rows(&self, stacks: Vec<Vec<Block>>) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut cells = Vec::new();
        for (i, blocks) in stacks.into_iter().enumerate() {
            cells.push(Cell {
                x_offset: self.column_x(i % self.columns),
                width: self.column_width,
                blocks,
            });
            if cells.len() == self.columns {
                rows.push(Row {
                    cells: std::mem::take(&mut cells),
                });
            }
        }
        if !cells.is_empty() {
            rows.push(Row { cells });
        }
        rows
    }
}

/// Build the full document plan for one record.
pub fn map_record(
    record: &CustomerRecord,
    assets: &DocumentAssets,
    page: &PageGeometry,
    style: &LayoutStyle,
    columns: usize,
) -> DocumentPlan {
    let grid = GridColumns::new(page, style, columns);
    DocumentPlan {
        title: "Customer Detail".to_string(),
        subtitle: Some(format!("{} | ID {}", record.full_name.trim(), record.id.trim())),
        sections: vec![
            profile_section(record, &grid),
            documents_section(record.role, assets, &grid),
            address_section(&record.addresses, &grid, style),
        ],
    }
}

fn field(label: &str, value: Option<&str>) -> Vec<Block> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(MISSING_VALUE);
    vec![
        Block::Label {
            text: label.to_string(),
        },
        Block::Value {
            text: value.to_string(),
            emphasis: false,
        },
    ]
}

/// Label/value pairs in display order, with role-specific fields.
pub fn profile_fields(record: &CustomerRecord) -> Vec<(&'static str, Option<&str>)> {
    let mut fields = vec![
        ("Full Name", Some(record.full_name.as_str())),
        ("Email", Some(record.email.as_str())),
        ("Phone Number", Some(record.phone.as_str())),
        ("Role", Some(record.role.display_name())),
        ("Gender", record.gender.as_deref()),
        ("Birth Date", record.birth_date.as_deref()),
        ("Status", record.status.as_deref()),
        ("Registered At", record.registered_at.as_deref()),
    ];
    match record.role {
        Role::Veterinarian => fields.push(("KTA Number", record.kta_number.as_deref())),
        Role::Petshop => fields.push(("Shop Name", record.shop_name.as_deref())),
        Role::Customer => {}
    }
    fields
}

fn profile_section(record: &CustomerRecord, grid: &GridColumns) -> Section {
    let stacks = profile_fields(record)
        .into_iter()
        .map(|(label, value)| field(label, value))
        .collect();
    Section {
        title: PROFILE_TITLE.to_string(),
        icon: Some(IconKind::IdCard),
        body: SectionBody::Grid(grid.rows(stacks)),
    }
}

/// Label of the second document slot, if the role has one.
pub fn secondary_document_label(role: Role) -> Option<&'static str> {
    match role {
        Role::Veterinarian => Some("KTA"),
        Role::Petshop => Some("Pet Shop Buildings"),
        Role::Customer => None,
    }
}

fn document_stack(label: &str, slot: ImageSlot, assets: &DocumentAssets) -> Vec<Block> {
    let source = if assets.has(slot) {
        ImageSource::Asset(slot)
    } else {
        ImageSource::Placeholder(MISSING_IMAGE.to_string())
    };
    vec![
        Block::Label {
            text: label.to_string(),
        },
        Block::Image { source },
    ]
}

fn documents_section(role: Role, assets: &DocumentAssets, grid: &GridColumns) -> Section {
    let mut stacks = vec![document_stack(
        "Identity Card (KTP)",
        ImageSlot::IdentityDocument,
        assets,
    )];
    if let Some(label) = secondary_document_label(role) {
        stacks.push(document_stack(label, ImageSlot::SecondaryDocument, assets));
    }
    Section {
        title: DOCUMENTS_TITLE.to_string(),
        icon: Some(IconKind::IdCard),
        body: SectionBody::Grid(grid.rows(stacks)),
    }
}

/// One address as a row: pin, text stack, chevron.
fn address_row(address: &Address, grid: &GridColumns, style: &LayoutStyle) -> Row {
    let icon = style.item_icon_size;
    let text_x = icon + style.gap;
    let text_width = grid.inner_width - 2.0 * text_x;

    let mut text = vec![
        Block::Value {
            text: address.name.clone(),
            emphasis: true,
        },
        Block::Label {
            text: address.phone.clone(),
        },
    ];
    if !address.detail.trim().is_empty() {
        text.push(Block::Value {
            text: address.detail.clone(),
            emphasis: false,
        });
    }
    text.push(Block::Value {
        text: address.address.clone(),
        emphasis: false,
    });

    Row {
        cells: vec![
            Cell {
                x_offset: 0.0,
                width: icon,
                blocks: vec![Block::Icon {
                    kind: IconKind::Pin,
                    size: icon,
                }],
            },
            Cell {
                x_offset: text_x,
                width: text_width,
                blocks: text,
            },
            Cell {
                x_offset: grid.inner_width - icon,
                width: icon,
                blocks: vec![Block::Icon {
                    kind: IconKind::Chevron,
                    size: icon,
                }],
            },
        ],
    }
}

fn address_section(addresses: &[Address], grid: &GridColumns, style: &LayoutStyle) -> Section {
    Section {
        title: ADDRESSES_TITLE.to_string(),
        icon: Some(IconKind::Map),
        body: SectionBody::List {
            items: addresses
                .iter()
                .map(|a| address_row(a, grid, style))
                .collect(),
            empty_text: EMPTY_ADDRESSES.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: Role) -> CustomerRecord {
        CustomerRecord {
            id: "U-1".into(),
            full_name: "Sari Wulandari".into(),
            email: "sari@example.com".into(),
            phone: "081234567890".into(),
            role,
            kta_number: Some("KTA-2231".into()),
            shop_name: Some("Sari Pet".into()),
            addresses: vec![
                Address {
                    name: "Home".into(),
                    phone: "0811".into(),
                    detail: "".into(),
                    address: "Jl. Melati 1".into(),
                },
                Address {
                    name: "Office".into(),
                    phone: "0812".into(),
                    detail: "Tower B".into(),
                    address: "Jl. Sudirman 5".into(),
                },
            ],
            ..Default::default()
        }
    }

    fn plan(role: Role) -> DocumentPlan {
        map_record(
            &record(role),
            &DocumentAssets::default(),
            &PageGeometry::a4(40.0),
            &LayoutStyle::default(),
            2,
        )
    }

    fn labels(section: &Section) -> Vec<String> {
        section
            .rows()
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.blocks.iter())
            .filter_map(|b| match b {
                Block::Label { text } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sections_in_order() {
        let titles: Vec<_> = plan(Role::Customer)
            .sections
            .iter()
            .map(|s| s.title.clone())
            .collect();
        assert_eq!(titles, [PROFILE_TITLE, DOCUMENTS_TITLE, ADDRESSES_TITLE]);
    }

    #[test]
    fn veterinarian_gets_kta_fields() {
        let p = plan(Role::Veterinarian);
        assert!(labels(&p.sections[0]).contains(&"KTA Number".to_string()));
        assert!(labels(&p.sections[1]).contains(&"KTA".to_string()));
    }

    #[test]
    fn petshop_gets_building_slot_and_no_kta_number() {
        let p = plan(Role::Petshop);
        assert!(!labels(&p.sections[0]).contains(&"KTA Number".to_string()));
        assert!(labels(&p.sections[1]).contains(&"Pet Shop Buildings".to_string()));
        assert!(!labels(&p.sections[1]).contains(&"KTA".to_string()));
    }

    #[test]
    fn customer_has_single_document_slot() {
        let p = plan(Role::Customer);
        assert_eq!(labels(&p.sections[1]), ["Identity Card (KTP)"]);
    }

    #[test]
    fn grid_columns_follow_column_width() {
        let p = plan(Role::Customer);
        let page = PageGeometry::a4(40.0);
        let style = LayoutStyle::default();
        let expected = page.column_width(2, style.section_padding, style.column_gap);
        for row in p.sections[0].rows() {
            assert!(row.cells.len() <= 2);
            for (i, cell) in row.cells.iter().enumerate() {
                assert_eq!(cell.width, expected);
                assert_eq!(cell.x_offset, i as f32 * (expected + style.column_gap));
            }
        }
        // 8 customer fields in 2 columns
        assert_eq!(p.sections[0].rows().len(), 4);
    }

    #[test]
    fn missing_images_become_placeholders() {
        let p = plan(Role::Veterinarian);
        let placeholders = p.sections[1]
            .rows()
            .iter()
            .flat_map(|r| r.cells.iter())
            .flat_map(|c| c.blocks.iter())
            .filter(|b| matches!(b, Block::Image { source: ImageSource::Placeholder(_) }))
            .count();
        assert_eq!(placeholders, 2);
    }

    #[test]
    fn addresses_keep_source_order_and_skip_empty_detail() {
        let p = plan(Role::Customer);
        let items = p.sections[2].rows();
        assert_eq!(items.len(), 2);
        let first_text = &items[0].cells[1].blocks;
        let second_text = &items[1].cells[1].blocks;
        assert_eq!(first_text.len(), 3);
        assert_eq!(second_text.len(), 4);
        assert!(matches!(&first_text[0], Block::Value { text, emphasis: true } if text == "Home"));
        assert!(matches!(&second_text[0], Block::Value { text, .. } if text == "Office"));
    }

    #[test]
    fn missing_values_render_as_dash() {
        let stack = field("Gender", None);
        assert!(matches!(&stack[1], Block::Value { text, .. } if text == "-"));
    }
}
