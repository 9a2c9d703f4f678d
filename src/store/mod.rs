//! Key-value persistence for preferences and the invoice sequence.

mod connection;
mod memory;
mod sqlite;

pub use connection::open_store;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;

/// Storage keys. The names are shared with earlier data so they stay fixed.
pub mod keys {
    pub const INVOICE_SEQUENCE: &str = "invoiceSequence";
    pub const LAST_INVOICE_DATE: &str = "lastInvoiceDate";
    pub const BG_COLOR: &str = "bgColor";
    pub const TEXT_COLOR: &str = "textColor";
    pub const CURRENCY: &str = "currency";
    pub const THEME: &str = "theme";
}

/// String key-value storage. `get` returns `None` both for absent keys and
/// for a backend that cannot be read.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
