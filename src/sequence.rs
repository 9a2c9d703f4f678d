//! Date-qualified invoice numbering.
//!
//! An invoice number is `{YYYYMMDD}-{sequence}`. The sequence starts at 1000
//! each calendar day and increments on every preview. Both halves are kept in
//! the settings store so numbering carries over between sessions.
//!
//! Day rollover is only noticed when [`SequenceGenerator::advance`] runs.
//! Leaving the editor open across midnight keeps showing yesterday's number
//! until the next preview, which then starts the new day at 1000.

use std::fmt;

use tracing::{debug, info, warn};

use crate::calendar::{CalendarDay, Clock};
use crate::error::StoreError;
use crate::store::{keys, SettingsStore};

/// First sequence value of every day.
pub const FIRST_SEQUENCE: u32 = 1000;

/// Persisted numbering state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
    pub date: CalendarDay,
    pub sequence: u32,
}

impl SequenceState {
    /// Numbering state at the start of `today`.
    pub fn fresh(today: CalendarDay) -> Self {
        Self {
            date: today,
            sequence: FIRST_SEQUENCE,
        }
    }

    /// The state after one more invoice: a new day restarts at 1000,
    /// otherwise the sequence goes up by one.
    pub fn advanced(self, today: CalendarDay) -> Self {
        if self.date != today {
            Self::fresh(today)
        } else {
            Self {
                date: self.date,
                sequence: self.sequence.saturating_add(1),
            }
        }
    }

    /// Read the stored pair. A missing or unreadable date, or one that is
    /// not `today`, yields the fresh state; a missing, non-numeric or zero
    /// sequence reads as 1000.
    pub fn load<S: SettingsStore + ?Sized>(store: &S, today: CalendarDay) -> Self {
        let stored_date = store
            .get(keys::LAST_INVOICE_DATE)
            .and_then(|raw| CalendarDay::parse_key(&raw));

        match stored_date {
            Some(date) if date == today => Self {
                date,
                sequence: parse_sequence(store.get(keys::INVOICE_SEQUENCE).as_deref()),
            },
            _ => Self::fresh(today),
        }
    }

    /// Write both keys back to the store.
    pub fn persist<S: SettingsStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        store.set(keys::INVOICE_SEQUENCE, &self.sequence.to_string())?;
        store.set(keys::LAST_INVOICE_DATE, &self.date.key())?;
        Ok(())
    }

    pub fn number(&self) -> InvoiceNumber {
        InvoiceNumber {
            date: self.date,
            sequence: self.sequence,
        }
    }
}

fn parse_sequence(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|sequence| *sequence > 0)
        .unwrap_or(FIRST_SEQUENCE)
}

/// Human-readable identifier derived from a [`SequenceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceNumber {
    pub date: CalendarDay,
    pub sequence: u32,
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.key(), self.sequence)
    }
}

/// Today's date key (`YYYYMMDD`) according to `clock`.
pub fn current_date_key<C: Clock + ?Sized>(clock: &C) -> String {
    clock.today().key()
}

/// Holds the single in-memory copy of the numbering state and writes every
/// change through to the store.
#[derive(Debug)]
pub struct SequenceGenerator<C: Clock> {
    clock: C,
    state: SequenceState,
}

impl<C: Clock> SequenceGenerator<C> {
    /// Load the stored state. When the stored pair had to be reset (new day,
    /// nothing stored, corrupt values) the reset pair is written back; a
    /// failed write is logged and the in-memory state is used regardless.
    pub fn load<S: SettingsStore + ?Sized>(store: &S, clock: C) -> Self {
        let today = clock.today();
        let state = SequenceState::load(store, today);

        let stored_sequence = store.get(keys::INVOICE_SEQUENCE);
        let stored_date = store.get(keys::LAST_INVOICE_DATE);
        if stored_sequence.as_deref() != Some(state.sequence.to_string().as_str())
            || stored_date.as_deref() != Some(state.date.key().as_str())
        {
            debug!(number = %state.number(), "normalising stored invoice sequence");
            if let Err(err) = state.persist(store) {
                warn!(error = %err, "failed to store invoice sequence");
            }
        }

        Self { clock, state }
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn current_number(&self) -> InvoiceNumber {
        self.state.number()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Move to the next invoice number and persist it. The in-memory state
    /// advances even if the write fails; the error is returned so the caller
    /// can report it.
    pub fn advance<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<InvoiceNumber, StoreError> {
        let today = self.clock.today();
        let next = self.state.advanced(today);
        if next.date != self.state.date {
            info!(from = %self.state.date, to = %today, "new day, invoice sequence restarts");
        }
        self.state = next;
        debug!(number = %next.number(), "advanced invoice number");
        next.persist(store)?;
        Ok(next.number())
    }

    /// Forget the stored history and restart today's numbering at 1000.
    pub fn reset<S: SettingsStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<InvoiceNumber, StoreError> {
        self.state = SequenceState::fresh(self.clock.today());
        info!(number = %self.state.number(), "invoice sequence reset");
        self.state.persist(store)?;
        Ok(self.state.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::store::MemoryStore;

    fn may_first() -> CalendarDay {
        CalendarDay::from_ymd(2024, 5, 1).unwrap()
    }

    /// Store whose writes always fail and whose reads find nothing.
    struct BrokenStore;

    impl SettingsStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk full".into()))
        }
    }

    #[test]
    fn fresh_start_numbers_from_1000() {
        let store = MemoryStore::new();
        let clock = FixedClock::new(may_first());
        let generator = SequenceGenerator::load(&store, &clock);

        assert_eq!(generator.current_number().to_string(), "20240501-1000");
        assert_eq!(store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1000"));
        assert_eq!(store.get(keys::LAST_INVOICE_DATE).as_deref(), Some("20240501"));
        assert_eq!(current_date_key(&clock), "20240501");
    }

    #[test]
    fn three_previews_on_the_same_day() {
        let store = MemoryStore::new();
        let clock = FixedClock::new(may_first());
        let mut generator = SequenceGenerator::load(&store, &clock);

        let numbers: Vec<String> = (0..3)
            .map(|_| generator.advance(&store).unwrap().to_string())
            .collect();
        assert_eq!(
            numbers,
            ["20240501-1001", "20240501-1002", "20240501-1003"]
        );
        assert_eq!(store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1003"));
    }

    #[test]
    fn consecutive_advances_differ_by_one() {
        let store = MemoryStore::with_entries([
            (keys::LAST_INVOICE_DATE, "20240501"),
            (keys::INVOICE_SEQUENCE, "1500"),
        ]);
        let clock = FixedClock::new(may_first());
        let mut generator = SequenceGenerator::load(&store, &clock);

        let first = generator.advance(&store).unwrap();
        let second = generator.advance(&store).unwrap();
        assert_eq!(second.sequence - first.sequence, 1);
        assert_eq!(first.sequence, 1501);
    }

    #[test]
    fn advance_on_a_new_day_restarts_numbering() {
        let store = MemoryStore::new();
        let clock = FixedClock::new(may_first());
        let mut generator = SequenceGenerator::load(&store, &clock);
        for _ in 0..41 {
            generator.advance(&store).unwrap();
        }
        assert_eq!(generator.state().sequence, 1041);

        clock.advance_day();
        let number = generator.advance(&store).unwrap();
        assert_eq!(number.to_string(), "20240502-1000");
        assert_eq!(store.get(keys::LAST_INVOICE_DATE).as_deref(), Some("20240502"));
    }

    #[test]
    fn midnight_is_not_noticed_before_the_next_advance() {
        let store = MemoryStore::new();
        let clock = FixedClock::new(may_first());
        let mut generator = SequenceGenerator::load(&store, &clock);
        generator.advance(&store).unwrap();

        clock.advance_day();
        assert_eq!(generator.current_number().to_string(), "20240501-1001");
    }

    #[test]
    fn advanced_resets_regardless_of_prior_value() {
        let today = may_first();
        for sequence in [1000, 1042, u32::MAX] {
            let state = SequenceState {
                date: today.pred(),
                sequence,
            };
            assert_eq!(state.advanced(today), SequenceState::fresh(today));
        }
    }

    #[test]
    fn yesterdays_state_resets_on_load() {
        let store = MemoryStore::with_entries([
            (keys::LAST_INVOICE_DATE, "20240430"),
            (keys::INVOICE_SEQUENCE, "1042"),
        ]);
        let generator = SequenceGenerator::load(&store, FixedClock::new(may_first()));

        assert_eq!(generator.state(), SequenceState::fresh(may_first()));
        assert_eq!(store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1000"));
        assert_eq!(store.get(keys::LAST_INVOICE_DATE).as_deref(), Some("20240501"));
    }

    #[test]
    fn reset_always_returns_fresh_state() {
        let store = MemoryStore::with_entries([
            (keys::LAST_INVOICE_DATE, "20240501"),
            (keys::INVOICE_SEQUENCE, "1777"),
        ]);
        let mut generator =
            SequenceGenerator::load(&store, FixedClock::new(may_first()));
        assert_eq!(generator.state().sequence, 1777);

        let number = generator.reset(&store).unwrap();
        assert_eq!(number.to_string(), "20240501-1000");
        assert_eq!(generator.state(), SequenceState::fresh(may_first()));
        assert_eq!(store.get(keys::INVOICE_SEQUENCE).as_deref(), Some("1000"));
    }

    #[test]
    fn persist_then_load_round_trips() {
        let store = MemoryStore::new();
        let state = SequenceState {
            date: may_first(),
            sequence: 1234,
        };
        state.persist(&store).unwrap();
        assert_eq!(SequenceState::load(&store, may_first()), state);
    }

    #[test]
    fn corrupt_values_fall_back_to_defaults() {
        let today = may_first();
        let cases = [
            (Some("20240501"), Some("abc"), 1000),
            (Some("20240501"), None, 1000),
            (Some("20240501"), Some("0"), 1000),
            (Some("20240501"), Some("-7"), 1000),
            (Some("20240501"), Some(" 1010 "), 1010),
        ];
        for (date, sequence, expected) in cases {
            let store = MemoryStore::new();
            if let Some(date) = date {
                store.set(keys::LAST_INVOICE_DATE, date).unwrap();
            }
            if let Some(sequence) = sequence {
                store.set(keys::INVOICE_SEQUENCE, sequence).unwrap();
            }
            assert_eq!(SequenceState::load(&store, today).sequence, expected);
        }

        let store = MemoryStore::with_entries([
            (keys::LAST_INVOICE_DATE, "2024-05-01"),
            (keys::INVOICE_SEQUENCE, "1200"),
        ]);
        assert_eq!(SequenceState::load(&store, today), SequenceState::fresh(today));
    }

    #[test]
    fn failed_write_still_advances_in_memory() {
        let store = BrokenStore;
        let clock = FixedClock::new(may_first());
        let mut generator = SequenceGenerator::load(&store, &clock);
        assert_eq!(generator.state(), SequenceState::fresh(may_first()));

        assert!(generator.advance(&store).is_err());
        assert_eq!(generator.state().sequence, 1001);
    }
}
