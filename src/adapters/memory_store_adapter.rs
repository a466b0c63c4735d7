//! In-process key-value store, used for tests and throwaway sessions.

use std::collections::HashMap;

use crate::domain::error::JournalError;
use crate::ports::store_port::KeyValueStore;

#[derive(Debug, Default, Clone)]
pub struct MemoryStoreAdapter {
    values: HashMap<String, String>,
}

impl MemoryStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStoreAdapter {
    fn get(&self, key: &str) -> Result<Option<String>, JournalError> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), JournalError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
