use std::path::PathBuf;

use anyhow::{anyhow, Result};
use ratatui::text::Line;

use crate::logo::expand_home;
use crate::models::{InvoiceDetails, LineField, LineItem};
use crate::preferences::{HexColor, Preferences};

use super::helpers::field_line;

/// Longest quantity the item form accepts, in digits.
const MAX_QUANTITY_DIGITS: usize = 9;
/// Longest unit price the item form accepts, in digits.
const MAX_PRICE_DIGITS: usize = 15;

/// Line item being edited in the modal. Every keystroke is pushed into the
/// editor right away so the total follows the typing; `original` restores the
/// row when the edit is cancelled.
#[derive(Clone)]
pub(crate) struct ItemForm {
    pub(crate) index: usize,
    pub(crate) description: String,
    pub(crate) quantity: String,
    pub(crate) unit_price: String,
    pub(crate) active: LineField,
    pub(crate) original: LineItem,
}

impl ItemForm {
    /// Populate the form from the row at `index`. Zero numbers show as empty
    /// so the user can type straight away.
    pub(crate) fn from_item(index: usize, item: &LineItem) -> Self {
        Self {
            index,
            description: item.description.clone(),
            quantity: if item.quantity == 0 {
                String::new()
            } else {
                item.quantity.to_string()
            },
            unit_price: if item.unit_price.is_zero() {
                String::new()
            } else {
                item.unit_price.normalize().to_string()
            },
            active: LineField::Description,
            original: item.clone(),
        }
    }

    pub(crate) fn value(&self, field: LineField) -> &str {
        match field {
            LineField::Description => &self.description,
            LineField::Quantity => &self.quantity,
            LineField::UnitPrice => &self.unit_price,
        }
    }

    fn value_mut(&mut self, field: LineField) -> &mut String {
        match field {
            LineField::Description => &mut self.description,
            LineField::Quantity => &mut self.quantity,
            LineField::UnitPrice => &mut self.unit_price,
        }
    }

    /// Cycle focus across description, quantity and unit price.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            LineField::Description => LineField::Quantity,
            LineField::Quantity => LineField::UnitPrice,
            LineField::UnitPrice => LineField::Description,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            LineField::Description => LineField::UnitPrice,
            LineField::Quantity => LineField::Description,
            LineField::UnitPrice => LineField::Quantity,
        };
    }

    /// Append a character to the active field. Quantity takes digits only,
    /// the unit price digits and a single decimal point, both up to a fixed
    /// number of digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            LineField::Description => !ch.is_control(),
            LineField::Quantity => {
                ch.is_ascii_digit() && self.quantity.len() < MAX_QUANTITY_DIGITS
            }
            LineField::UnitPrice => {
                let digits = self.unit_price.chars().filter(char::is_ascii_digit).count();
                (ch.is_ascii_digit() && digits < MAX_PRICE_DIGITS)
                    || (ch == '.' && !self.unit_price.contains('.'))
            }
        };
        if accepted {
            self.value_mut(self.active).push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) -> bool {
        self.value_mut(self.active).pop().is_some()
    }

    pub(crate) fn build_line(&self, field: LineField) -> Line<'static> {
        let placeholder = match field {
            LineField::Description => "<item description>",
            LineField::Quantity => "0",
            LineField::UnitPrice => "0.00",
        };
        field_line(field.label(), self.value(field), placeholder, self.active == field)
    }

    pub(crate) fn value_len(&self, field: LineField) -> usize {
        self.value(field).chars().count()
    }
}

/// Fields of the company/customer form.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum DetailsField {
    #[default]
    CompanyName,
    CompanyAddress,
    CompanyPhone,
    BuyerName,
}

impl DetailsField {
    pub(crate) const ALL: [DetailsField; 4] = [
        DetailsField::CompanyName,
        DetailsField::CompanyAddress,
        DetailsField::CompanyPhone,
        DetailsField::BuyerName,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            DetailsField::CompanyName => "Company",
            DetailsField::CompanyAddress => "Address",
            DetailsField::CompanyPhone => "Phone",
            DetailsField::BuyerName => "Customer",
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct DetailsForm {
    pub(crate) details: InvoiceDetails,
    pub(crate) active: DetailsField,
}

impl DetailsForm {
    pub(crate) fn from_details(details: &InvoiceDetails) -> Self {
        Self {
            details: details.clone(),
            active: DetailsField::CompanyName,
        }
    }

    pub(crate) fn value(&self, field: DetailsField) -> &str {
        match field {
            DetailsField::CompanyName => &self.details.company_name,
            DetailsField::CompanyAddress => &self.details.company_address,
            DetailsField::CompanyPhone => &self.details.company_phone,
            DetailsField::BuyerName => &self.details.buyer_name,
        }
    }

    fn value_mut(&mut self, field: DetailsField) -> &mut String {
        match field {
            DetailsField::CompanyName => &mut self.details.company_name,
            DetailsField::CompanyAddress => &mut self.details.company_address,
            DetailsField::CompanyPhone => &mut self.details.company_phone,
            DetailsField::BuyerName => &mut self.details.buyer_name,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            DetailsField::CompanyName => DetailsField::CompanyAddress,
            DetailsField::CompanyAddress => DetailsField::CompanyPhone,
            DetailsField::CompanyPhone => DetailsField::BuyerName,
            DetailsField::BuyerName => DetailsField::CompanyName,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            DetailsField::CompanyName => DetailsField::BuyerName,
            DetailsField::CompanyAddress => DetailsField::CompanyName,
            DetailsField::CompanyPhone => DetailsField::CompanyAddress,
            DetailsField::BuyerName => DetailsField::CompanyPhone,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    /// Trimmed copy of the entered details.
    pub(crate) fn into_details(self) -> InvoiceDetails {
        let InvoiceDetails {
            company_name,
            company_address,
            company_phone,
            buyer_name,
        } = self.details;
        InvoiceDetails {
            company_name: company_name.trim().to_string(),
            company_address: company_address.trim().to_string(),
            company_phone: company_phone.trim().to_string(),
            buyer_name: buyer_name.trim().to_string(),
        }
    }

    pub(crate) fn build_line(&self, field: DetailsField) -> Line<'static> {
        field_line(field.label(), self.value(field), "<optional>", self.active == field)
    }

    pub(crate) fn value_len(&self, field: DetailsField) -> usize {
        self.value(field).chars().count()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub(crate) enum ColorField {
    #[default]
    Background,
    Text,
}

/// Preview color form; both values must be `#rrggbb`.
#[derive(Default, Clone)]
pub(crate) struct ColorForm {
    pub(crate) background: String,
    pub(crate) text: String,
    pub(crate) active: ColorField,
    pub(crate) error: Option<String>,
}

impl ColorForm {
    pub(crate) fn from_preferences(prefs: &Preferences) -> Self {
        Self {
            background: prefs.background.to_string(),
            text: prefs.text.to_string(),
            active: ColorField::Background,
            error: None,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            ColorField::Background => ColorField::Text,
            ColorField::Text => ColorField::Background,
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            ColorField::Background => &mut self.background,
            ColorField::Text => &mut self.text,
        }
    }

    /// Accept `#` as the first character and hex digits after it, up to the
    /// seven characters of `#rrggbb`.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let value = self.active_value();
        let accepted = if value.is_empty() {
            ch == '#' || ch.is_ascii_hexdigit()
        } else {
            ch.is_ascii_hexdigit() && value.len() < 7
        };
        if accepted {
            if value.is_empty() && ch != '#' {
                value.push('#');
            }
            value.push(ch.to_ascii_lowercase());
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    /// Validate both colors before they are stored.
    pub(crate) fn parse_inputs(&self) -> Result<(HexColor, HexColor)> {
        let background = HexColor::parse(&self.background)
            .ok_or_else(|| anyhow!("Background must look like #rrggbb."))?;
        let text = HexColor::parse(&self.text)
            .ok_or_else(|| anyhow!("Text color must look like #rrggbb."))?;
        Ok((background, text))
    }

    pub(crate) fn build_line(&self, field: ColorField) -> Line<'static> {
        let (name, value) = match field {
            ColorField::Background => ("Background", &self.background),
            ColorField::Text => ("Text", &self.text),
        };
        field_line(name, value, "#rrggbb", self.active == field)
    }

    pub(crate) fn value_len(&self, field: ColorField) -> usize {
        match field {
            ColorField::Background => self.background.chars().count(),
            ColorField::Text => self.text.chars().count(),
        }
    }
}

/// Single-field form asking for the path of a logo image.
#[derive(Default, Clone)]
pub(crate) struct LogoForm {
    pub(crate) path: String,
    pub(crate) error: Option<String>,
}

impl LogoForm {
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.path.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.path.pop();
    }

    pub(crate) fn parse_inputs(&self) -> Result<PathBuf> {
        if self.path.trim().is_empty() {
            return Err(anyhow!("Logo path is required."));
        }
        Ok(expand_home(&self.path))
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        field_line("Path", &self.path, "<path to png/jpg/svg>", true)
    }
}
