//! Scope guards for groups and arrays
//!
//! A guard opens its scope on construction and closes it when dropped, so
//! an early return or a panic never leaves the thread's cursor inside a
//! group or array.

use tracing::warn;

use crate::Result;
use crate::settings::Settings;

/// Keeps a group open for the guard's lifetime
#[derive(Debug)]
#[must_use = "the group closes when the guard is dropped"]
pub struct GroupScope<'a> {
    settings: &'a Settings,
    end_all: bool,
}

impl<'a> GroupScope<'a> {
    /// Enter `name`; dropping the guard leaves it again.
    pub fn new(settings: &'a Settings, name: &str) -> Result<Self> {
        settings.begin_group(name)?;
        Ok(Self {
            settings,
            end_all: false,
        })
    }

    /// Enter `name`; dropping the guard leaves every group.
    pub fn end_all(settings: &'a Settings, name: &str) -> Result<Self> {
        settings.begin_group(name)?;
        Ok(Self {
            settings,
            end_all: true,
        })
    }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        if self.end_all {
            self.settings.end_all_group();
        } else {
            self.settings.end_group();
        }
    }
}

/// Keeps an array open for the guard's lifetime
#[derive(Debug)]
#[must_use = "the array closes when the guard is dropped"]
pub struct ArrayScope<'a> {
    settings: &'a Settings,
    len: usize,
    open: bool,
}

impl<'a> ArrayScope<'a> {
    /// Open `prefix` for reading; [`len`](Self::len) is its declared size.
    pub fn read(settings: &'a Settings, prefix: &str) -> Result<Self> {
        let len = settings.begin_read_array(prefix)?;
        Ok(Self {
            settings,
            len,
            open: true,
        })
    }

    /// Open `prefix` for writing, with a fixed size or auto-sized.
    pub fn write(settings: &'a Settings, prefix: &str, size: Option<usize>) -> Result<Self> {
        settings.begin_write_array(prefix, size)?;
        Ok(Self {
            settings,
            len: size.unwrap_or(0),
            open: true,
        })
    }

    /// Declared size when opened (0 for auto-sized write scopes)
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if the array declared no elements
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Select the 0-based element
    pub fn set_index(&self, index: usize) {
        self.settings.set_array_index(index);
    }

    /// Close the array now, reporting a failed size write.
    pub fn finish(mut self) -> Result<()> {
        self.open = false;
        self.settings.end_array()
    }
}

impl Drop for ArrayScope<'_> {
    fn drop(&mut self) {
        if self.open
            && let Err(e) = self.settings.end_array()
        {
            warn!("Failed to close array scope: {e}");
        }
    }
}
