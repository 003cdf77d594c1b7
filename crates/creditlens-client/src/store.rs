use std::collections::VecDeque;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ulid::Ulid;

use crate::engine::score::ScoredRecord;
use crate::{ClientError, ClientResult};

pub const DEFAULT_BATCH_CAPACITY: usize = 16;

/// A scored upload kept around so individual customers can be looked up later.
#[derive(Debug, Clone)]
pub struct StoredBatch {
    pub batch_id: String,
    pub sheet_name: String,
    pub records: Arc<Vec<ScoredRecord>>,
}

impl StoredBatch {
    pub fn find_customer(&self, customer_id: &str) -> Option<&ScoredRecord> {
        let wanted = customer_id.trim();
        self.records
            .iter()
            .find(|record| record.customer_id() == Some(wanted))
    }
}

/// In-memory, bounded cache of recently scored batches.
///
/// The store is owned by whoever serves requests and handed to them
/// explicitly; the scoring engine never sees it. Oldest batches are evicted
/// first once `capacity` is reached.
#[derive(Debug)]
pub struct BatchStore {
    capacity: usize,
    batches: RwLock<VecDeque<StoredBatch>>,
}

impl Default for BatchStore {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_CAPACITY)
    }
}

impl BatchStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            batches: RwLock::new(VecDeque::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn insert(&self, sheet_name: &str, records: Vec<ScoredRecord>) -> StoredBatch {
        let batch = StoredBatch {
            batch_id: format!("bat_{}", Ulid::new().to_string().to_lowercase()),
            sheet_name: sheet_name.to_string(),
            records: Arc::new(records),
        };

        let mut batches = self.write();
        while batches.len() >= self.capacity {
            if let Some(evicted) = batches.pop_front() {
                log::debug!("evicting batch {}", evicted.batch_id);
            }
        }
        batches.push_back(batch.clone());
        batch
    }

    pub fn latest(&self) -> ClientResult<StoredBatch> {
        self.read()
            .back()
            .cloned()
            .ok_or_else(ClientError::no_batch_available)
    }

    pub fn get(&self, batch_id: &str) -> ClientResult<StoredBatch> {
        self.read()
            .iter()
            .find(|batch| batch.batch_id == batch_id)
            .cloned()
            .ok_or_else(|| ClientError::batch_not_found(batch_id))
    }

    /// Looks a customer up in `batch_id`, or in the most recent batch when no id is given.
    pub fn find_customer(
        &self,
        batch_id: Option<&str>,
        customer_id: &str,
    ) -> ClientResult<ScoredRecord> {
        let batch = match batch_id {
            Some(id) => self.get(id)?,
            None => self.latest()?,
        };
        batch
            .find_customer(customer_id)
            .cloned()
            .ok_or_else(|| ClientError::customer_not_found(customer_id))
    }

    // A poisoned lock only means a writer panicked mid-push; the deque is still valid.
    fn read(&self) -> RwLockReadGuard<'_, VecDeque<StoredBatch>> {
        self.batches
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, VecDeque<StoredBatch>> {
        self.batches
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
