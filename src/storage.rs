use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Durable key-value slots for deck state. Payloads are opaque serialized
/// records; an absent key means no prior state.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_slot(&self, key: &str) -> Result<Option<String>>;
    async fn put_slot(&self, key: &str, payload: &str) -> Result<()>;
    async fn delete_slot(&self, key: &str) -> Result<u64>;
}

/// In-memory [`Storage`] for embedding without a database, and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get_slot(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.lock().unwrap().get(key).cloned())
    }

    async fn put_slot(&self, key: &str, payload: &str) -> Result<()> {
        self.slots
            .lock()
            .unwrap()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn delete_slot(&self, key: &str) -> Result<u64> {
        Ok(self.slots.lock().unwrap().remove(key).map_or(0, |_| 1))
    }
}
