//! Display preferences persisted between sessions: currency symbol, preview
//! colors and the UI theme.

use std::fmt;

use tracing::debug;

use crate::error::StoreError;
use crate::store::{keys, SettingsStore};

/// Currencies offered by the editor as `(code, symbol)`. The symbol is only a
/// display prefix; amounts are never converted.
pub const CURRENCIES: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("NGN", "₦"),
    ("INR", "₹"),
];

pub const DEFAULT_CURRENCY: &str = "$";
pub const DEFAULT_BACKGROUND: HexColor = HexColor::new(0xff, 0xff, 0xff);
pub const DEFAULT_TEXT: HexColor = HexColor::new(0x00, 0x00, 0x00);

/// A `#rrggbb` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (case-insensitive, leading `#` required).
    pub fn parse(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub currency: String,
    pub background: HexColor,
    pub text: HexColor,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            background: DEFAULT_BACKGROUND,
            text: DEFAULT_TEXT,
            theme: Theme::default(),
        }
    }
}

impl Preferences {
    /// Read every preference, substituting the default for anything missing
    /// or malformed.
    pub fn load<S: SettingsStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();
        Self {
            currency: store
                .get(keys::CURRENCY)
                .filter(|symbol| is_valid_currency(symbol))
                .unwrap_or(defaults.currency),
            background: store
                .get(keys::BG_COLOR)
                .and_then(|raw| HexColor::parse(&raw))
                .unwrap_or(defaults.background),
            text: store
                .get(keys::TEXT_COLOR)
                .and_then(|raw| HexColor::parse(&raw))
                .unwrap_or(defaults.text),
            theme: store
                .get(keys::THEME)
                .and_then(|raw| Theme::parse(&raw))
                .unwrap_or(defaults.theme),
        }
    }

    /// Three-letter code of the current symbol when it is one we offer.
    pub fn currency_code(&self) -> Option<&'static str> {
        CURRENCIES
            .iter()
            .find(|(_, symbol)| *symbol == self.currency)
            .map(|(code, _)| *code)
    }

    /// Change the currency symbol. Anything but a single visible character is
    /// ignored and reported as `Ok(false)`.
    pub fn set_currency<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
        symbol: &str,
    ) -> Result<bool, StoreError> {
        if !is_valid_currency(symbol) {
            return Ok(false);
        }
        self.currency = symbol.to_string();
        store.set(keys::CURRENCY, &self.currency)?;
        debug!(currency = %self.currency, "currency changed");
        Ok(true)
    }

    /// Step to the next offered currency, wrapping around. A custom symbol
    /// moves to the first entry.
    pub fn cycle_currency<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), StoreError> {
        let next = CURRENCIES
            .iter()
            .position(|(_, symbol)| *symbol == self.currency)
            .map(|idx| (idx + 1) % CURRENCIES.len())
            .unwrap_or(0);
        self.set_currency(store, CURRENCIES[next].1)?;
        Ok(())
    }

    pub fn set_colors<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
        background: HexColor,
        text: HexColor,
    ) -> Result<(), StoreError> {
        self.background = background;
        self.text = text;
        store.set(keys::BG_COLOR, &background.to_string())?;
        store.set(keys::TEXT_COLOR, &text.to_string())?;
        Ok(())
    }

    /// Restore the default colors and drop the stored overrides.
    pub fn reset_colors<S: SettingsStore + ?Sized>(&mut self, store: &S) -> Result<(), StoreError> {
        self.background = DEFAULT_BACKGROUND;
        self.text = DEFAULT_TEXT;
        store.remove(keys::BG_COLOR)?;
        store.remove(keys::TEXT_COLOR)?;
        Ok(())
    }

    pub fn toggle_theme<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<Theme, StoreError> {
        self.theme = self.theme.toggled();
        store.set(keys::THEME, self.theme.as_str())?;
        Ok(self.theme)
    }
}

fn is_valid_currency(symbol: &str) -> bool {
    let mut chars = symbol.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_whitespace() && !c.is_control())
}
