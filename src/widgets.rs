//! Reusable clickable UI components.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::text::Line;

use crate::input::ClickState;

/// Pairs rendered [`Line`]s with click actions.
///
/// Lines added with [`push_clickable`](ClickableList::push_clickable) get a
/// click target bound to whatever row they end up on, so inserting or
/// removing lines above them never desyncs the target. Call
/// [`register_targets`](ClickableList::register_targets) once after building
/// the list, then render `into_lines()` with a `Paragraph`.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)` pairs.
    actions: Vec<(u16, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Add a non-clickable line.
    pub fn push(&mut self, line: Line<'a>) {
        self.lines.push(line);
    }

    /// Add a clickable line with its action ID.
    pub fn push_clickable(&mut self, line: Line<'a>, action_id: u16) {
        let idx = self.lines.len() as u16;
        self.actions.push((idx, action_id));
        self.lines.push(line);
    }

    /// Consume the builder, returning the lines for rendering.
    pub fn into_lines(self) -> Vec<Line<'a>> {
        self.lines
    }

    /// Register click targets for every clickable line.
    ///
    /// * `top_offset` / `bottom_offset` — rows taken by borders.
    ///
    /// Assumes one logical line per visual row (no `Wrap`); lines clipped by
    /// the area get no target.
    pub fn register_targets(
        &self,
        area: Rect,
        cs: &mut ClickState,
        top_offset: u16,
        bottom_offset: u16,
    ) {
        let content_y = area.y + top_offset;
        let content_end = area.y + area.height.saturating_sub(bottom_offset);

        for &(line_idx, action_id) in &self.actions {
            let row = content_y + line_idx;
            if row >= content_end {
                continue;
            }
            cs.add_row_target(area, row, action_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ClickState;

    #[test]
    fn clickable_rows_register_at_their_line_index() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("header"));
        cl.push_clickable(Line::from("spawn"), 1);
        cl.push_clickable(Line::from("buy"), 3);
        cl.push(Line::from("footer"));

        // Bordered block: content starts one row in.
        let area = Rect::new(0, 5, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(10, 7), Some(1));
        assert_eq!(cs.hit_test(10, 8), Some(3));
        assert_eq!(cs.hit_test(10, 6), None); // header
        assert_eq!(cs.hit_test(10, 9), None); // footer
    }

    #[test]
    fn lines_clipped_by_area_get_no_target() {
        let mut cl = ClickableList::new();
        for i in 0..20 {
            cl.push_clickable(Line::from(format!("row {i}")), 50 + i as u16);
        }

        // Height 5 with borders → 3 content rows.
        let area = Rect::new(0, 0, 80, 5);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(10, 3), Some(52));
        assert_eq!(cs.hit_test(10, 4), None);
    }

    #[test]
    fn inserting_header_shifts_targets() {
        let mut cl = ClickableList::new();
        cl.push(Line::from("title"));
        cl.push(Line::from("subtitle"));
        cl.push_clickable(Line::from("action"), 42);

        let area = Rect::new(0, 0, 80, 10);
        let mut cs = ClickState::new();
        cl.register_targets(area, &mut cs, 1, 1);

        assert_eq!(cs.hit_test(10, 3), Some(42));
        assert_eq!(cs.hit_test(10, 2), None);
    }

    #[test]
    fn empty_list_registers_nothing() {
        let cl: ClickableList = ClickableList::new();
        assert!(cl.into_lines().is_empty());

        let cl: ClickableList = ClickableList::new();
        let mut cs = ClickState::new();
        cl.register_targets(Rect::new(0, 0, 80, 10), &mut cs, 1, 1);
        assert_eq!(cs.targets.len(), 0);
    }
}
