use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// SHA-256 of the catalog and ratings bytes
    Inputs(String),
}

impl CacheKey {
    /// Fingerprints a pair of input files
    ///
    /// Each input is length-prefixed so that moving bytes from one file to the
    /// other changes the key.
    pub fn for_inputs(catalog: &[u8], ratings: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        for bytes in [catalog, ratings] {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }
        CacheKey::Inputs(format!("{:x}", hasher.finalize()))
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Inputs(fingerprint) => write!(f, "inputs:{}", fingerprint),
        }
    }
}

/// In-process memo of the result derived from the latest input snapshot
///
/// Holds at most one entry. A new fingerprint replaces the previous entry, so
/// results for superseded inputs are dropped once no request holds them.
#[derive(Debug)]
pub struct SessionCache<T> {
    slot: Mutex<Option<(CacheKey, Arc<T>)>>,
}

impl<T> Default for SessionCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T> SessionCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> AppResult<Option<Arc<T>>> {
        Ok(self
            .lock()?
            .as_ref()
            .filter(|(cached, _)| cached == key)
            .map(|(_, value)| Arc::clone(value)))
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(usize::from(self.lock()?.is_some()))
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.lock()?.is_none())
    }

    /// Returns the cached value for `key`, computing it and replacing any
    /// stale entry on a miss
    ///
    /// The lock is held while computing so concurrent callers with the same
    /// inputs compute once. A failed computation leaves the previous entry in place.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> AppResult<Arc<T>>
    where
        F: FnOnce() -> AppResult<T>,
    {
        let mut slot = self.lock()?;
        if let Some((cached, value)) = slot.as_ref() {
            if *cached == key {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(Arc::clone(value));
            }
            tracing::debug!(stale = %cached, key = %key, "Inputs changed, replacing cached entry");
        } else {
            tracing::debug!(key = %key, "Cache miss, computing");
        }

        let value = Arc::new(compute()?);
        *slot = Some((key, Arc::clone(&value)));
        Ok(value)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Option<(CacheKey, Arc<T>)>>> {
        self.slot
            .lock()
            .map_err(|_| AppError::Internal("session cache lock poisoned".to_string()))
    }
}
