use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::io::SourceKey;

/// Single-slot memo keyed by source identity.
///
/// Holding a value for one source and asking for another evicts the first.
#[derive(Debug)]
pub struct SourceCache<T> {
    slot: Option<(SourceKey, Arc<T>)>,
}

impl<T> Default for SourceCache<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> SourceCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, running `load` on a miss.
    ///
    /// A failed load leaves the slot empty.
    pub fn get_or_try_load<F>(&mut self, key: SourceKey, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some((cached_key, value)) = &self.slot {
            if *cached_key == key {
                debug!("source cache hit");
                return Ok(Arc::clone(value));
            }
        }

        debug!("source cache miss");
        self.slot = None;
        let value = Arc::new(load()?);
        self.slot = Some((key, Arc::clone(&value)));
        Ok(value)
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.slot.as_ref().map(|(_, value)| Arc::clone(value))
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}
