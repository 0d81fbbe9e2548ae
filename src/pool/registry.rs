use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;

/// Shared registry of hosts temporarily excluded from selection.
///
/// An entry means "do not attempt this host right now". Selection strategies
/// insert entries when a connection attempt fails fatally; the removal policy
/// belongs to the registry alone -- entries expire after `ttl` (or stay until
/// [`clear`](UnavailableHosts::clear) when no ttl is set). One registry is
/// created per pool and handed to every selection call by reference.
///
/// Reads and writes are safe under concurrent selection calls. A host marked
/// by one task may still be attempted by another task whose pick was already
/// in flight; eventual visibility is all callers get, and all they need.
#[derive(Debug)]
pub struct UnavailableHosts {
    hosts: RwLock<HashMap<String, Instant>>,
    ttl: Option<Duration>,
}

impl UnavailableHosts {
    pub fn new(ttl: Option<Duration>) -> UnavailableHosts {
        UnavailableHosts {
            hosts: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register `host` as unusable from now on.
    pub fn mark(&self, host: &str) {
        debug!("marking host {} unusable", host);
        self.hosts.write().insert(host.to_string(), Instant::now());
    }

    /// Whether `host` is currently excluded. Expired entries report eligible.
    pub fn contains(&self, host: &str) -> bool {
        match self.hosts.read().get(host) {
            None => false,
            Some(since) => self.ttl.map_or(true, |ttl| since.elapsed() < ttl),
        }
    }

    /// Drop `host` from the registry ahead of its expiry.
    pub fn clear(&self, host: &str) {
        self.hosts.write().remove(host);
    }

    /// Drop every entry past the expiry timeout.
    pub fn purge_expired(&self) {
        if let Some(ttl) = self.ttl {
            self.hosts.write().retain(|_, since| since.elapsed() < ttl);
        }
    }

    /// Number of currently excluded hosts.
    pub fn len(&self) -> usize {
        let hosts = self.hosts.read();
        match self.ttl {
            None => hosts.len(),
            Some(ttl) => hosts.values().filter(|since| since.elapsed() < ttl).count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
