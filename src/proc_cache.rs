//! Bounded, time-evicted cache of pid -> executable name
//!
//! Process-name resolution goes through the kernel on every miss; windows of
//! long-lived processes would pay that cost on every pass without this cache.
//! Entries not seen for a while are evicted opportunistically so the map
//! tracks the set of live pids instead of growing forever.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::constants::cache;
use crate::desktop::DesktopError;

struct Entry {
    name: String,
    last_seen: Instant,
}

/// Pid -> executable name cache with age-based eviction.
pub struct ProcessNameCache {
    entries: HashMap<u32, Entry>,
    max_age: Duration,
}

impl Default for ProcessNameCache {
    fn default() -> Self {
        Self::with_max_age(Duration::from_secs(cache::PROCESS_NAME_MAX_AGE_SECS))
    }
}

impl ProcessNameCache {
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_age,
        }
    }

    /// Cached name for `pid`, resolving and caching on a miss.
    ///
    /// A failed lookup caches the empty string, matching the contract that a
    /// window with an unresolvable process simply matches no Process rule.
    pub fn resolve(
        &mut self,
        pid: u32,
        lookup: impl FnOnce(u32) -> Result<String, DesktopError>,
    ) -> String {
        let now = Instant::now();
        if let Some(entry) = self.entries.get_mut(&pid) {
            entry.last_seen = now;
            return entry.name.clone();
        }
        let name = lookup(pid).unwrap_or_else(|e| {
            debug!(pid, error = %e, "process name lookup failed");
            String::new()
        });
        trace!(pid, name = %name, "caching process name");
        self.entries.insert(
            pid,
            Entry {
                name: name.clone(),
                last_seen: now,
            },
        );
        name
    }

    /// Drop entries not seen within the max age. Called once per full pass.
    pub fn evict_stale(&mut self) {
        self.evict_older_than(Instant::now());
    }

    fn evict_older_than(&mut self, now: Instant) {
        let max_age = self.max_age;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_seen) <= max_age);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.entries.len(), "evicted stale process names");
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
