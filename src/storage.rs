//! Browser-local-storage analog for the single-use checkout snapshots.
//!
//! `currentOrder` and `paymentSuccess` must survive navigation and a reload
//! through the payment step, and nothing else. A key maps to one JSON file;
//! the in-memory store backs tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::payment::{PaymentReceipt, PendingOrder};
use crate::Result;

pub const CURRENT_ORDER: &str = "currentOrder";
pub const PAYMENT_SUCCESS: &str = "paymentSuccess";

pub trait SessionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per entry under a state directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Typed access to the two single-use snapshots.
#[derive(Clone)]
pub struct Receipts {
    store: Arc<dyn SessionStore>,
}

impl Receipts {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.load(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store.save(key, &serde_json::to_string(value)?)
    }

    pub fn save_pending_order(&self, order: &PendingOrder) -> Result<()> {
        self.put(CURRENT_ORDER, order)
    }

    pub fn pending_order(&self) -> Result<Option<PendingOrder>> {
        self.get(CURRENT_ORDER)
    }

    pub fn save_payment_receipt(&self, receipt: &PaymentReceipt) -> Result<()> {
        self.put(PAYMENT_SUCCESS, receipt)
    }

    pub fn payment_receipt(&self) -> Result<Option<PaymentReceipt>> {
        self.get(PAYMENT_SUCCESS)
    }

    /// Remove both snapshots; they are scoped to one completed checkout.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(CURRENT_ORDER)?;
        self.store.remove(PAYMENT_SUCCESS)
    }
}
