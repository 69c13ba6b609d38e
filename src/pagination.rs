//! Pagination – flows a [`DocumentPlan`] onto fixed-size pages.
//!
//! Handles:
//! - A4 page boundaries with a single write cursor per page
//! - Section boxes closed per page segment and sized from placed content
//! - Continuation headers when a section spills onto a new page
//! - Atomic rows: grid rows and list items are never split
//! - Separator suppression at the bottom of a page

use crate::cursor::{Cursor, PageGeometry, Placer};
use crate::layout_config::{LayoutConfig, PageLayout, PlacedItem, SectionSegment};
use crate::measure::Measurer;
use crate::plan::{Block, Cell, DocumentPlan, Row, Section, SectionBody};

/// How the list separator decides whether a break is imminent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorLookahead {
    /// Use the item just placed as a stand-in for the next one. Cheap, and
    /// may break one item early or leave a rule above a break when item
    /// heights differ.
    #[default]
    PreviousItem,
    /// Measure the next item before deciding.
    NextItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    WithinPage,
    PageBreak,
}

/// The part of a section currently open on the page.
#[derive(Debug, Clone, Copy)]
struct Segment {
    top: f32,
    units: usize,
    continuation: bool,
    /// Nothing preceded the segment on its page.
    at_page_top: bool,
}

struct Paginator<'a> {
    measurer: &'a Measurer<'a>,
    placer: Placer<'a>,
    page: PageGeometry,
    lookahead: SeparatorLookahead,
    config: LayoutConfig,
    current: PageLayout,
    cursor: Cursor,
    state: FlowState,
}

/// Lay the plan out into pages.
pub fn paginate(
    plan: &DocumentPlan,
    page: &PageGeometry,
    measurer: &Measurer<'_>,
    lookahead: SeparatorLookahead,
) -> LayoutConfig {
    let config = LayoutConfig {
        title: plan.title.clone(),
        page_width_pt: page.width,
        page_height_pt: page.height,
        pages: Vec::new(),
    };
    let paginator = Paginator {
        measurer,
        placer: Placer::new(measurer),
        page: *page,
        lookahead,
        config,
        current: PageLayout::new(0),
        cursor: Cursor::top_of(page),
        state: FlowState::WithinPage,
    };
    paginator.run(plan)
}

impl<'a> Paginator<'a> {
    fn run(mut self, plan: &DocumentPlan) -> LayoutConfig {
        self.place_title(plan);
        for section in &plan.sections {
            self.layout_section(section);
        }
        self.config.pages.push(self.current);
        log::debug!("Paginated '{}' into {} page(s)", plan.title, self.config.pages.len());
        self.config
    }

    /// Lowest cursor position a unit may end at: room must remain for the
    /// trailing gap and the box's bottom padding.
    fn limit(&self) -> f32 {
        let style = self.measurer.style;
        self.page.printable_bottom() - style.section_padding - style.gap
    }

    fn inner_left(&self) -> f32 {
        self.page.printable_left() + self.measurer.style.section_padding
    }

    fn inner_width(&self) -> f32 {
        self.page.content_width() - 2.0 * self.measurer.style.section_padding
    }

    fn overflows(&self, height: f32) -> bool {
        self.cursor.y + height > self.limit()
    }

    fn place_title(&mut self, plan: &DocumentPlan) {
        let style = self.measurer.style;
        let x = self.page.printable_left();
        let width = self.page.content_width();
        let h = self.placer.place_text(
            &mut self.current.elements,
            &plan.title,
            &style.title,
            x,
            self.cursor.y,
            width,
        );
        self.cursor.advance(h, style.block_gap);
        if let Some(subtitle) = &plan.subtitle {
            let h = self.placer.place_text(
                &mut self.current.elements,
                subtitle,
                &style.subtitle,
                x,
                self.cursor.y,
                width,
            );
            self.cursor.advance(h, 0.0);
        }
        self.cursor.advance(0.0, style.section_spacing);
    }

    /// Finish the current page and reset the cursor to the top margin.
    fn new_page(&mut self) {
        let index = self.current.page_index + 1;
        let finished = std::mem::replace(&mut self.current, PageLayout::new(index));
        self.config.pages.push(finished);
        self.cursor = Cursor::top_of(&self.page);
    }

    /// Start a box at the cursor and draw the section header inside it.
    fn open_segment(&mut self, section: &Section, continuation: bool) -> Segment {
        let at_page_top = self.current.elements.is_empty();
        let top = self.cursor.y;
        self.cursor.y += self.measurer.style.section_padding;
        let origin = Cursor {
            x: self.inner_left(),
            y: self.cursor.y,
        };
        let width = self.inner_width();
        let used = self.placer.place_header(
            &mut self.current.elements,
            &section.title,
            section.icon,
            origin,
            width,
        );
        self.cursor.y += used;
        Segment {
            top,
            units: 0,
            continuation,
            at_page_top,
        }
    }

    /// Draw the box of the open segment and record it on the page.
    fn close_segment(&mut self, section: &Section, segment: &Segment) {
        let height = self.placer.close_section(
            &mut self.current.elements,
            &self.page,
            segment.top,
            self.cursor,
        );
        self.current.segments.push(SectionSegment {
            title: section.title.clone(),
            top: segment.top,
            bottom: segment.top + height,
            continuation: segment.continuation,
        });
        self.cursor.y = segment.top + height;
    }

    fn break_page(&mut self, section: &Section, segment: &mut Segment) {
        self.close_segment(section, segment);
        log::debug!(
            "Page {} full; continuing '{}' on page {}",
            self.current.page_index + 1,
            section.title,
            self.current.page_index + 2
        );
        self.new_page();
        *segment = self.open_segment(section, true);
    }

    /// Place one atomic row, breaking the page first if it does not fit.
    fn place_unit(
        &mut self,
        section: &Section,
        segment: &mut Segment,
        row: &Row,
        height: f32,
        item: Option<usize>,
    ) {
        loop {
            match self.state {
                FlowState::WithinPage => {
                    // A unit that overflows an otherwise empty fresh page is
                    // placed anyway; breaking again would not help.
                    let can_break = segment.units > 0 || !segment.at_page_top;
                    if self.overflows(height) && can_break {
                        self.state = FlowState::PageBreak;
                        continue;
                    }
                    break;
                }
                FlowState::PageBreak => {
                    self.break_page(section, segment);
                    self.state = FlowState::WithinPage;
                }
            }
        }

        let origin = Cursor {
            x: self.inner_left(),
            y: self.cursor.y,
        };
        self.placer.place_row(&mut self.current.elements, row, origin);
        if let Some(index) = item {
            self.current.items.push(PlacedItem {
                section: section.title.clone(),
                index,
                top: origin.y,
                bottom: origin.y + height,
            });
        }
        self.cursor.advance(height, self.measurer.style.gap);
        segment.units += 1;
    }

    /// Draw the rule after list item `index`, unless the next item is
    /// expected not to fit, in which case a break is scheduled instead.
    fn separate(&mut self, items: &[Row], index: usize, placed_height: f32) {
        let next_height = match self.lookahead {
            SeparatorLookahead::PreviousItem => placed_height,
            SeparatorLookahead::NextItem => self.measurer.row_height(&items[index + 1]),
        };
        let separator = self.measurer.separator_height();
        let gap = self.measurer.style.gap;
        if self.overflows(separator + gap + next_height) {
            log::debug!("Suppressing separator after item {index}; breaking before the next item");
            self.state = FlowState::PageBreak;
            return;
        }
        let origin = Cursor {
            x: self.inner_left(),
            y: self.cursor.y,
        };
        let width = self.inner_width();
        let h = self
            .placer
            .place(&mut self.current.elements, &Block::Separator, origin, width);
        self.cursor.advance(h, gap);
    }

    fn empty_state_row(&self, text: &str) -> Row {
        Row {
            cells: vec![Cell {
                x_offset: 0.0,
                width: self.inner_width(),
                blocks: vec![Block::Label {
                    text: text.to_string(),
                }],
            }],
        }
    }

    fn layout_section(&mut self, section: &Section) {
        let style = self.measurer.style;
        let empty_row = match &section.body {
            SectionBody::List { items, empty_text } if items.is_empty() => {
                Some(self.empty_state_row(empty_text))
            }
            _ => None,
        };
        let rows: &[Row] = match &empty_row {
            Some(row) => std::slice::from_ref(row),
            None => section.rows(),
        };

        // Keep the header together with the first unit.
        let header = self
            .placer
            .header_extent(&section.title, section.icon.is_some(), self.inner_width());
        let first = rows
            .first()
            .map(|r| self.measurer.row_height(r))
            .unwrap_or(0.0);
        let page_used = !self.current.elements.is_empty();
        if page_used && self.overflows(style.section_padding + header + first) {
            log::debug!("Moving section '{}' to a new page", section.title);
            self.new_page();
        }

        let mut segment = self.open_segment(section, false);
        let list_items = empty_row.is_none() && section.is_list();
        for (i, row) in rows.iter().enumerate() {
            let height = self.measurer.row_height(row);
            let item = list_items.then_some(i);
            self.place_unit(section, &mut segment, row, height, item);
            if list_items && i + 1 < rows.len() {
                self.separate(rows, i, height);
            }
        }
        self.close_segment(section, &segment);
        self.cursor.advance(0.0, style.section_spacing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;
    use crate::icons::IconKind;
    use crate::layout_config::RuleRole;
    use crate::measure::LayoutStyle;

    fn text_row(lines: usize) -> Row {
        Row {
            cells: vec![Cell {
                x_offset: 0.0,
                width: 400.0,
                blocks: vec![Block::Value {
                    text: vec!["line"; lines].join("\n"),
                    emphasis: false,
                }],
            }],
        }
    }

    fn list_plan(items: Vec<Row>) -> DocumentPlan {
        DocumentPlan {
            title: "T".into(),
            subtitle: None,
            sections: vec![Section {
                title: "List".into(),
                icon: Some(IconKind::Map),
                body: SectionBody::List {
                    items,
                    empty_text: "Nothing".into(),
                },
            }],
        }
    }

    fn run(plan: &DocumentPlan, lookahead: SeparatorLookahead) -> LayoutConfig {
        let fonts = FontManager::default();
        let style = LayoutStyle::default();
        let m = Measurer::new(&fonts, &style);
        paginate(plan, &PageGeometry::a4(40.0), &m, lookahead)
    }

    #[test]
    fn empty_list_draws_one_minimal_box() {
        let config = run(&list_plan(vec![]), SeparatorLookahead::PreviousItem);
        assert_eq!(config.pages.len(), 1);
        let page = &config.pages[0];
        assert_eq!(page.segments.len(), 1);
        assert!(page.items.is_empty());
        assert_eq!(page.rules(RuleRole::ItemSeparator).count(), 0);
        assert!(page.texts().any(|t| t == "Nothing"));
    }

    #[test]
    fn items_never_cross_the_printable_bottom() {
        let items: Vec<Row> = (0..80).map(|i| text_row(1 + i % 4)).collect();
        let config = run(&list_plan(items), SeparatorLookahead::PreviousItem);
        assert!(config.pages.len() > 1);
        let bottom = PageGeometry::a4(40.0).printable_bottom();
        let mut seen = Vec::new();
        for page in &config.pages {
            for item in &page.items {
                assert!(item.bottom <= bottom + 1e-3, "item {} overflows", item.index);
                seen.push(item.index);
            }
            for seg in &page.segments {
                assert!(seg.bottom <= bottom + 1e-3);
            }
        }
        assert_eq!(seen, (0..80).collect::<Vec<_>>());
    }

    #[test]
    fn continuation_pages_repeat_header() {
        let items: Vec<Row> = (0..60).map(|_| text_row(2)).collect();
        let config = run(&list_plan(items), SeparatorLookahead::PreviousItem);
        assert!(config.pages.len() >= 2);
        for (i, page) in config.pages.iter().enumerate() {
            assert_eq!(page.segments.len(), 1);
            assert_eq!(page.segments[0].continuation, i > 0);
            assert_eq!(page.rules(RuleRole::Header).count(), 1);
            assert!(page.texts().any(|t| t == "List"));
        }
    }

    #[test]
    fn oversized_item_is_placed_on_a_fresh_page() {
        let items = vec![text_row(1), text_row(80), text_row(1)];
        let config = run(&list_plan(items), SeparatorLookahead::PreviousItem);
        let placements: Vec<(usize, usize)> = config
            .placed_items()
            .map(|(page, item)| (page, item.index))
            .collect();
        assert_eq!(placements.len(), 3);
        assert_eq!(placements[0], (0, 0));
        assert_eq!(placements[1], (1, 1));
        assert_eq!(placements[2].1, 2);
        assert!(config.pages.len() <= 3);
    }

    #[test]
    fn no_separator_directly_above_a_break_with_true_lookahead() {
        let items: Vec<Row> = (0..50).map(|i| text_row(1 + (i * 7) % 5)).collect();
        let config = run(&list_plan(items), SeparatorLookahead::NextItem);
        for page in &config.pages[..config.pages.len() - 1] {
            let last_item = page.items.last().expect("page has items");
            for rule in page.rules(RuleRole::ItemSeparator) {
                assert!(rule.y < last_item.top, "dangling separator on page {}", page.page_index);
            }
        }
    }

    #[test]
    fn separators_sit_between_items_only() {
        let items: Vec<Row> = (0..3).map(|_| text_row(1)).collect();
        let config = run(&list_plan(items), SeparatorLookahead::PreviousItem);
        let page = &config.pages[0];
        let rules: Vec<f32> = page.rules(RuleRole::ItemSeparator).map(|r| r.y).collect();
        assert_eq!(rules.len(), 2);
        assert!(rules[0] > page.items[0].bottom && rules[0] < page.items[1].top);
        assert!(rules[1] > page.items[1].bottom && rules[1] < page.items[2].top);
    }
}
