//! Key-value storage port. Values are opaque strings stored under a key.

use crate::domain::error::JournalError;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError>;

    fn put(&mut self, key: &str, value: &str) -> Result<(), JournalError>;
}
