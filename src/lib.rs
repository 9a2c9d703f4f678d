//! Core library surface for the invoice generator TUI.
//!
//! The numbering, totals and line item rules live in plain modules with no
//! terminal dependency so they can be tested on their own; `ui` wires them to
//! Ratatui and `store` keeps the few values that survive a restart.
pub mod calendar;
pub mod config;
pub mod error;
pub mod export;
pub mod invoice;
pub mod items;
pub mod logging;
pub mod logo;
pub mod models;
pub mod preferences;
pub mod sequence;
pub mod store;
pub mod totals;
pub mod ui;

pub use calendar::{CalendarDay, Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use items::LineItemEditor;
pub use models::{InvoiceDetails, LineField, LineItem};
pub use sequence::{InvoiceNumber, SequenceGenerator};
pub use store::{open_store, MemoryStore, SettingsStore, SqliteStore};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
