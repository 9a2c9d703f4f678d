//! The editable list of line items.

use rust_decimal::Decimal;

use crate::models::{LineField, LineItem};
use crate::totals::{compute_total, parse_price, parse_quantity};

/// Owns the line items of the invoice being edited. The list is never empty:
/// it starts with one blank row and falls back to one blank row whenever the
/// last item is removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemEditor {
    items: Vec<LineItem>,
}

impl Default for LineItemEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemEditor {
    pub fn new() -> Self {
        Self {
            items: vec![LineItem::blank()],
        }
    }

    /// Start from existing rows; an empty vector still yields one blank row.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        let mut editor = Self { items };
        editor.ensure_not_empty();
        editor
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a blank row and return its index.
    pub fn add(&mut self) -> usize {
        self.items.push(LineItem::blank());
        self.items.len() - 1
    }

    /// Replace one field of the row at `index` with user input. Numeric
    /// fields are coerced (invalid text becomes 0); the description is stored
    /// as typed. Returns `false` when `index` is out of range.
    pub fn edit(&mut self, index: usize, field: LineField, raw: &str) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        match field {
            LineField::Description => item.description = raw.to_string(),
            LineField::Quantity => item.quantity = parse_quantity(raw),
            LineField::UnitPrice => item.unit_price = parse_price(raw),
        }
        true
    }

    /// Overwrite a whole row, used to revert a cancelled edit.
    pub fn replace(&mut self, index: usize, item: LineItem) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Delete the row at `index`. Removing the last row leaves a single blank
    /// row behind. Returns the removed item, `None` when out of range.
    pub fn remove(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.ensure_not_empty();
        Some(removed)
    }

    /// Current total, recomputed from scratch.
    pub fn total(&self) -> Decimal {
        compute_total(&self.items)
    }

    fn ensure_not_empty(&mut self) {
        if self.items.is_empty() {
            self.items.push(LineItem::blank());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn starts_with_one_blank_item() {
        let editor = LineItemEditor::new();
        assert_eq!(editor.items(), &[LineItem::blank()]);
        assert_eq!(editor.total(), Decimal::ZERO);
    }

    #[test]
    fn removing_sole_item_leaves_blank_row() {
        let mut editor = LineItemEditor::new();
        editor.edit(0, LineField::Description, "Design work");
        editor.edit(0, LineField::Quantity, "4");

        let removed = editor.remove(0).unwrap();
        assert_eq!(removed.description, "Design work");
        assert_eq!(editor.items(), &[LineItem::blank()]);
    }

    #[test]
    fn add_then_remove_both_resolves_to_blank_and_zero() {
        let mut editor = LineItemEditor::new();
        editor.edit(0, LineField::Quantity, "2");
        editor.edit(0, LineField::UnitPrice, "3");
        editor.add();
        editor.remove(1);
        editor.remove(0);

        assert_eq!(editor.len(), 1);
        assert!(editor.items()[0].is_blank());
        assert_eq!(crate::totals::format_decimal(editor.total()), "0.00");
    }

    #[test]
    fn edits_recompute_total() {
        let mut editor = LineItemEditor::new();
        editor.edit(0, LineField::Quantity, "2");
        editor.edit(0, LineField::UnitPrice, "10.5");
        let second = editor.add();
        editor.edit(second, LineField::Quantity, "1");
        editor.edit(second, LineField::UnitPrice, "5");
        assert_eq!(editor.total(), Decimal::from_str("26").unwrap());

        editor.edit(second, LineField::UnitPrice, "not a number");
        assert_eq!(editor.total(), Decimal::from_str("21").unwrap());

        editor.remove(0);
        assert_eq!(editor.total(), Decimal::ZERO);
    }

    #[test]
    fn huge_quantity_and_price_do_not_overflow_the_total() {
        let mut editor = LineItemEditor::new();
        editor.edit(0, LineField::Quantity, "4294967295");
        editor.edit(0, LineField::UnitPrice, "100000000000000000000");
        assert_eq!(editor.items()[0].quantity, u32::MAX);
        assert_eq!(editor.total(), Decimal::MAX);

        editor.edit(0, LineField::UnitPrice, "2");
        assert_eq!(editor.total(), Decimal::from(u32::MAX) * Decimal::TWO);
    }

    #[test]
    fn description_is_stored_verbatim() {
        let mut editor = LineItemEditor::new();
        editor.edit(0, LineField::Description, "  12 widgets ");
        assert_eq!(editor.items()[0].description, "  12 widgets ");
        assert_eq!(editor.items()[0].quantity, 0);
    }

    #[test]
    fn out_of_range_index_is_a_no_op() {
        let mut editor = LineItemEditor::new();
        assert!(!editor.edit(3, LineField::Quantity, "9"));
        assert!(!editor.replace(1, LineItem::new("x", 1, Decimal::ONE)));
        assert_eq!(editor.remove(5), None);
        assert_eq!(editor.items(), &[LineItem::blank()]);
    }

    #[test]
    fn from_empty_items_still_has_a_row() {
        let editor = LineItemEditor::from_items(Vec::new());
        assert_eq!(editor.len(), 1);
        assert!(!editor.is_empty());
    }
}
