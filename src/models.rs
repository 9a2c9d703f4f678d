//! Domain models shared by the editor, the preview and the export. They stay
//! plain data holders; the arithmetic lives in `totals` and the list rules in
//! `items`.

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

/// One invoice row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LineItem {
    /// Free text shown in the first column.
    pub description: String,
    /// Whole units; fractional input is coerced to zero before it gets here.
    pub quantity: u32,
    /// Never negative.
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// The blank row that seeds a new invoice and replaces an emptied list.
    pub fn blank() -> Self {
        Self::default()
    }

    /// `quantity × unit_price` for this row, saturating at `Decimal::MAX`.
    pub fn amount(&self) -> Decimal {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_price)
            .unwrap_or(Decimal::MAX)
    }

    pub fn is_blank(&self) -> bool {
        self.description.is_empty() && self.quantity == 0 && self.unit_price.is_zero()
    }
}

/// Editable columns of a line item.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineField {
    Description,
    Quantity,
    UnitPrice,
}

impl LineField {
    pub const ALL: [LineField; 3] = [
        LineField::Description,
        LineField::Quantity,
        LineField::UnitPrice,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LineField::Description => "Description",
            LineField::Quantity => "Quantity",
            LineField::UnitPrice => "Unit price",
        }
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seller and buyer details printed at the top of the invoice. None of these
/// are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InvoiceDetails {
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub buyer_name: String,
}
