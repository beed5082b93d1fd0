//! Process-wide per-path lock registry
//!
//! Every handle bound to the same value-store location shares one mutex
//! that serializes individual flat-store accesses. Registry entries are
//! reference counted: the first [`PathLock`] for a location creates the
//! entry and dropping the last one removes it.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::{Mutex, MutexGuard};
use tracing::debug;

struct Entry {
    refs: usize,
    lock: Arc<Mutex<()>>,
}

static REGISTRY: LazyLock<Mutex<HashMap<String, Entry>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Counted reference to the lock of one store location
pub struct PathLock {
    location: String,
    lock: Arc<Mutex<()>>,
}

impl PathLock {
    /// Register interest in `location`, creating its lock on first use.
    pub fn acquire(location: &str) -> Self {
        let mut registry = REGISTRY.lock();
        let entry = registry.entry(location.to_string()).or_insert_with(|| {
            debug!("Registering path lock for {location}");
            Entry {
                refs: 0,
                lock: Arc::new(Mutex::new(())),
            }
        });
        entry.refs += 1;

        Self {
            location: location.to_string(),
            lock: Arc::clone(&entry.lock),
        }
    }

    /// Block until this location is free.
    pub fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    /// Location this lock serializes
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Live references registered for `location` (0 if none).
    pub fn registered_refs(location: &str) -> usize {
        REGISTRY.lock().get(location).map_or(0, |entry| entry.refs)
    }
}

impl Clone for PathLock {
    fn clone(&self) -> Self {
        Self::acquire(&self.location)
    }
}

impl Drop for PathLock {
    fn drop(&mut self) {
        let mut registry = REGISTRY.lock();
        if let Some(entry) = registry.get_mut(&self.location) {
            entry.refs = entry.refs.saturating_sub(1);
            if entry.refs == 0 {
                registry.remove(&self.location);
                debug!("Released path lock for {}", self.location);
            }
        }
    }
}

impl std::fmt::Debug for PathLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathLock")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
