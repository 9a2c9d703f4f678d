use std::cmp::min;
use std::path::PathBuf;

use crate::invoice::InvoiceSnapshot;

/// Selection state for the item list on the editor screen.
#[derive(Default)]
pub(crate) struct EditorScreen {
    pub(crate) selected: usize,
}

impl EditorScreen {
    /// Move the selection by `offset`, clamped to `len` rows.
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected as isize;
        let max_index = (len - 1) as isize;
        self.selected = (current + offset).clamp(0, max_index) as usize;
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keep the selection inside the list after rows were removed.
    pub(crate) fn clamp(&mut self, len: usize) {
        self.selected = min(self.selected, len.saturating_sub(1));
    }
}

/// The invoice shown on the preview screen, frozen when the preview opened.
pub(crate) struct PreviewScreen {
    pub(crate) snapshot: InvoiceSnapshot,
    pub(crate) scroll: u16,
    pub(crate) exported: Option<PathBuf>,
}

impl PreviewScreen {
    pub(crate) fn new(snapshot: InvoiceSnapshot) -> Self {
        Self {
            snapshot,
            scroll: 0,
            exported: None,
        }
    }

    /// Scroll by `offset` lines, keeping the last of `line_count` lines on
    /// screen.
    pub(crate) fn scroll_by(&mut self, offset: i32, line_count: usize) {
        let max = line_count.saturating_sub(1).min(u16::MAX as usize) as i32;
        self.scroll = (self.scroll as i32 + offset).clamp(0, max) as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarDay;
    use crate::items::LineItemEditor;
    use crate::models::InvoiceDetails;
    use crate::preferences::Preferences;
    use crate::sequence::SequenceState;

    #[test]
    fn selection_is_clamped() {
        let mut screen = EditorScreen::default();
        screen.move_selection(-3, 4);
        assert_eq!(screen.selected, 0);
        screen.move_selection(10, 4);
        assert_eq!(screen.selected, 3);
        screen.clamp(2);
        assert_eq!(screen.selected, 1);
        screen.select_last(6);
        assert_eq!(screen.selected, 5);
    }

    #[test]
    fn preview_scroll_stops_at_last_line() {
        let day = CalendarDay::from_ymd(2024, 5, 1).unwrap();
        let snapshot = InvoiceSnapshot::capture(
            SequenceState::fresh(day).number(),
            &InvoiceDetails::default(),
            &LineItemEditor::new(),
            &Preferences::default(),
            None,
        );
        let mut preview = PreviewScreen::new(snapshot);

        preview.scroll_by(-5, 12);
        assert_eq!(preview.scroll, 0);
        preview.scroll_by(10, 12);
        assert_eq!(preview.scroll, 10);
        preview.scroll_by(10, 12);
        assert_eq!(preview.scroll, 11);
        preview.scroll_by(1, 0);
        assert_eq!(preview.scroll, 0);
    }
}
