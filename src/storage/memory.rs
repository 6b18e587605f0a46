use crate::storage::Storage;
use crate::twoface::{externalerror::STORAGE_FAILED, Describe, Fallible};
use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory storage for tests. Clones share the same map.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    /// Make every later `set` and `remove` fail.
    pub fn make_read_only(&self) {
        *self.read_only.lock().unwrap() = true;
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        if *self.read_only.lock().unwrap() {
            return Err(anyhow!("storage is read-only").describe(STORAGE_FAILED));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        if *self.read_only.lock().unwrap() {
            return Err(anyhow!("storage is read-only").describe(STORAGE_FAILED));
        }
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
