//! Per-thread navigation state
//!
//! Each thread using a settings handle owns one [`NavContext`]: the active
//! group path plus an optional array scope. Contexts live in a
//! [`ContextTable`] keyed by thread id, are created on the first
//! state-changing call and dropped again once the thread returns to idle.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;
use tracing::debug;

/// Cursor over the virtual hierarchy for one thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavContext {
    /// `/`-joined group stack, empty when no group is active
    pub group: String,
    /// Array name relative to `group`, empty when no array is active
    pub array_prefix: String,
    /// Selected element (0-based); only set while `in_array`
    pub array_index: Option<usize>,
    /// An array scope is open
    pub in_array: bool,
    /// The open array scope was started for writing
    pub write_array: bool,
    /// The size field is written from `max_index` on `end_array`
    pub auto_size: bool,
    /// Highest index selected while auto-sizing
    pub max_index: Option<usize>,
}

impl Default for NavContext {
    fn default() -> Self {
        Self {
            group: String::new(),
            array_prefix: String::new(),
            array_index: None,
            in_array: false,
            write_array: false,
            auto_size: true,
            max_index: None,
        }
    }
}

impl NavContext {
    /// No group and no array scope
    pub fn is_idle(&self) -> bool {
        self.group.is_empty() && !self.in_array
    }

    /// Array scope that actually addresses something
    pub fn array_active(&self) -> bool {
        self.in_array && !self.array_prefix.is_empty()
    }

    /// Push a group name onto the group path
    pub fn begin_group(&mut self, name: &str) {
        if self.group.is_empty() {
            name.clone_into(&mut self.group);
        } else {
            self.group.push('/');
            self.group.push_str(name);
        }
    }

    /// Pop the last group segment; true once the group path is empty
    pub fn end_group(&mut self) -> bool {
        match self.group.rfind('/') {
            Some(pos) => self.group.truncate(pos),
            None => self.group.clear(),
        }
        self.group.is_empty()
    }

    /// Drop the whole group path, leaving any array scope alone
    pub fn end_all_groups(&mut self) {
        self.group.clear();
    }

    /// Open an array scope
    pub fn begin_array(&mut self, prefix: &str, write: bool, auto_size: bool) {
        prefix.clone_into(&mut self.array_prefix);
        self.array_index = None;
        self.in_array = true;
        self.write_array = write;
        self.auto_size = auto_size;
        self.max_index = None;
    }

    /// Select an element; tracks the high-water mark while auto-sizing
    pub fn set_array_index(&mut self, index: usize) {
        self.array_index = Some(index);
        if self.auto_size {
            self.max_index = Some(self.max_index.map_or(index, |max| max.max(index)));
        }
    }

    /// Size to record when the scope closes, if the scope records one
    pub fn pending_size(&self) -> Option<usize> {
        (self.auto_size && self.write_array).then(|| self.max_index.map_or(0, |max| max + 1))
    }

    /// Reset every array field to its idle value
    pub fn end_array(&mut self) {
        self.array_prefix.clear();
        self.array_index = None;
        self.in_array = false;
        self.write_array = false;
        self.auto_size = true;
        self.max_index = None;
    }
}

/// Navigation contexts of one settings handle, one per thread
#[derive(Debug, Default)]
pub struct ContextTable {
    contexts: Mutex<HashMap<ThreadId, NavContext>>,
}

impl ContextTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the calling thread's context (idle if it has none)
    pub fn current(&self) -> NavContext {
        self.contexts
            .lock()
            .get(&thread::current().id())
            .cloned()
            .unwrap_or_default()
    }

    /// Mutate the calling thread's context, creating it on first use.
    ///
    /// The entry is dropped afterwards if `f` left the context idle.
    pub fn update<R>(&self, f: impl FnOnce(&mut NavContext) -> R) -> R {
        let id = thread::current().id();
        let mut contexts = self.contexts.lock();
        let ctx = contexts.entry(id).or_default();
        let result = f(ctx);
        if ctx.is_idle() {
            contexts.remove(&id);
            debug!("Released navigation context for {id:?}");
        }
        result
    }

    /// Discard the calling thread's context
    pub fn clear_current(&self) {
        let id = thread::current().id();
        if self.contexts.lock().remove(&id).is_some() {
            debug!("Cleared navigation context for {id:?}");
        }
    }

    /// Number of live contexts
    pub fn len(&self) -> usize {
        self.contexts.lock().len()
    }

    /// True when no thread holds a context
    pub fn is_empty(&self) -> bool {
        self.contexts.lock().is_empty()
    }
}
