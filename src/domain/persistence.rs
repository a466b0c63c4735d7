//! Loading and saving the trade collection through a [`KeyValueStore`].
//!
//! The whole collection is one JSON array stored under a single key.

use tracing::{info, warn};

use super::error::JournalError;
use super::journal::Journal;
use super::trade::Trade;
use crate::ports::store_port::KeyValueStore;

pub const DEFAULT_STORAGE_KEY: &str = "trading-journal-trades";

/// Load the journal stored under `key`. A missing value, an unreadable store
/// or a value that does not parse all yield an empty journal.
pub fn load_journal(store: &dyn KeyValueStore, key: &str) -> Journal {
    read_journal(store, key).unwrap_or_else(|e| {
        warn!(key, error = %e, "failed to read stored trades, starting empty");
        Journal::new()
    })
}

/// Like [`load_journal`], but a failing store read is returned as an error.
/// Commands that save afterwards use this so they never write over a value
/// they could not read.
pub fn read_journal(store: &dyn KeyValueStore, key: &str) -> Result<Journal, JournalError> {
    let Some(raw) = store.get(key)? else {
        return Ok(Journal::new());
    };
    Ok(parse_journal(key, &raw))
}

fn parse_journal(key: &str, raw: &str) -> Journal {
    match serde_json::from_str::<Vec<Trade>>(raw) {
        Ok(trades) => {
            info!(key, count = trades.len(), "loaded trades");
            Journal::from_trades(trades)
        }
        Err(e) => {
            warn!(key, error = %e, "stored trades did not parse, starting empty");
            Journal::new()
        }
    }
}

pub fn save_journal(
    store: &mut dyn KeyValueStore,
    key: &str,
    journal: &Journal,
) -> Result<(), JournalError> {
    let raw = serde_json::to_string(journal.trades())?;
    store.put(key, &raw)?;
    info!(key, count = journal.len(), "saved trades");
    Ok(())
}
