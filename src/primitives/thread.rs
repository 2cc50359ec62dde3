use std::fmt;
use std::thread::{self, ThreadId};

use serde::Serialize;
use tracing::warn;

use crate::types::ThreadKey;

/// Human-readable identity of a recording thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThreadLabel {
    /// Key the recorder assigned to the thread.
    pub key: ThreadKey,
    /// OS thread name, `unnamed` when the thread has none.
    pub name: String,
    /// Debug form of the standard library thread id.
    pub os_id: String,
}

impl ThreadLabel {
    /// Label for the calling thread under `key`.
    pub fn current(key: ThreadKey) -> Self {
        let current = thread::current();
        Self {
            key,
            name: current.name().unwrap_or("unnamed").to_owned(),
            os_id: format!("{:?}", current.id()),
        }
    }
}

impl fmt::Display for ThreadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// Warns when the calling thread is not `expected`.
///
/// Purely advisory: returns whether the caller matched and never touches
/// recorded data.
pub fn check_thread(expected: ThreadId, what: &str) -> bool {
    let actual = thread::current().id();
    if actual == expected {
        return true;
    }
    warn!(
        expected = ?expected,
        actual = ?actual,
        "{what} has been called from another thread!"
    );
    false
}

/// Remembers the thread that created a value so later calls can be checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Binds to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    /// Thread this value is bound to.
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Runs [`check_thread`] against the owning thread.
    pub fn check(&self, what: &str) -> bool {
        check_thread(self.owner, what)
    }
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

/// Warns if the current thread is not the given owner thread.
///
/// `check_thread!(owner)` names the calling module; `check_thread!(owner, what)`
/// uses an explicit description.
#[macro_export]
macro_rules! check_thread {
    ($owner:expr) => {
        $crate::primitives::thread::check_thread($owner, module_path!())
    };
    ($owner:expr, $what:expr) => {
        $crate::primitives::thread::check_thread($owner, $what)
    };
}
