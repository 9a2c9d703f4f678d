//! The frozen view of an invoice that the preview screen and the export
//! render.

use rust_decimal::Decimal;

use crate::items::LineItemEditor;
use crate::logo::Logo;
use crate::models::{InvoiceDetails, LineItem};
use crate::preferences::Preferences;
use crate::sequence::InvoiceNumber;
use crate::totals::{compute_total, format_amount};

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSnapshot {
    pub number: InvoiceNumber,
    pub details: InvoiceDetails,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub preferences: Preferences,
    pub logo: Option<Logo>,
}

impl InvoiceSnapshot {
    pub fn capture(
        number: InvoiceNumber,
        details: &InvoiceDetails,
        items: &LineItemEditor,
        preferences: &Preferences,
        logo: Option<&Logo>,
    ) -> Self {
        let items = items.items().to_vec();
        Self {
            number,
            details: details.clone(),
            total: compute_total(&items),
            items,
            preferences: preferences.clone(),
            logo: logo.cloned(),
        }
    }

    pub fn money(&self, amount: Decimal) -> String {
        format_amount(amount, &self.preferences.currency)
    }

    pub fn total_display(&self) -> String {
        self.money(self.total)
    }

    /// Rows worth printing. Blank rows are dropped unless every row is blank.
    pub fn printable_items(&self) -> Vec<&LineItem> {
        let filled: Vec<&LineItem> = self.items.iter().filter(|item| !item.is_blank()).collect();
        if filled.is_empty() {
            self.items.iter().collect()
        } else {
            filled
        }
    }
}
