use std::collections::HashMap;
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, warn};
use rand::Rng;
use tokio::time;

use crate::connection::Connector;
use crate::errors::{DriverError, Result};
use crate::pool::registry::UnavailableHosts;

/// Borrowed view of the pool state one selection works on.
///
/// The pool snapshots its live map before delegating, so no lock is held
/// while a strategy awaits connection establishment.
pub struct PickContext<'a, C> {
    /// Configured candidate hosts, in configuration order.
    pub hosts: &'a [String],
    /// Established connections, one per host.
    pub live: &'a HashMap<String, C>,
    /// Shared registry of temporarily unusable hosts.
    pub registry: &'a UnavailableHosts,
    /// Latest response-time sample per candidate position. Weighting input
    /// for strategies that want it; the built-in ones do not.
    pub response_times: &'a [Duration],
    /// Extra full passes a strategy may take before giving up.
    pub retries: u8,
}

impl<'a, C> Clone for PickContext<'a, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, C> Copy for PickContext<'a, C> {}

/// Picks the connection that serves the next statement.
pub trait SelectionStrategy<T: Connector>: Send + Sync {
    /// Return a usable connection, or fail with
    /// [`DriverError::NoUsableHost`] once every option is exhausted.
    ///
    /// Connection failures never abort a pick early: the strategy classifies
    /// them through [`Connector::is_fatal`], optionally registers the host,
    /// and moves on to the remaining candidates.
    fn pick<'a>(
        &'a self,
        connector: &'a T,
        cx: PickContext<'a, T::Conn>,
    ) -> BoxFuture<'a, Result<T::Conn>>;
}

/// Uniform selection among the hosts absent from the unusable registry.
///
/// Reuses the live connection of the drawn host when one exists, creates a
/// new one otherwise. When a whole pass over the eligible hosts fails, the
/// pass is repeated after `retry_delay`, up to the retry budget of the pick.
#[derive(Clone, Debug)]
pub struct RandomStrategy {
    retry_delay: Duration,
}

impl RandomStrategy {
    pub fn new(retry_delay: Duration) -> RandomStrategy {
        RandomStrategy { retry_delay }
    }
}

impl<T: Connector> SelectionStrategy<T> for RandomStrategy {
    fn pick<'a>(
        &'a self,
        connector: &'a T,
        cx: PickContext<'a, T::Conn>,
    ) -> BoxFuture<'a, Result<T::Conn>> {
        Box::pin(async move {
            let mut pass = 0;
            loop {
                let mut whitelist: Vec<&str> = cx
                    .hosts
                    .iter()
                    .filter(|host| !cx.registry.contains(host))
                    .map(String::as_str)
                    .collect();

                while !whitelist.is_empty() {
                    let i = rand::thread_rng().gen_range(0..whitelist.len());
                    let host = whitelist[i];

                    if let Some(conn) = cx.live.get(host) {
                        return Ok(conn.clone());
                    }
                    match connector.connect(host).await {
                        Ok(conn) => {
                            debug!("connected to {}", host);
                            return Ok(conn);
                        }
                        Err(err) => {
                            if connector.is_fatal(&err) {
                                cx.registry.mark(host);
                            }
                            warn!("connection to {} failed: {}", host, err);
                            whitelist.swap_remove(i);
                        }
                    }
                }

                if pass >= cx.retries {
                    break;
                }
                pass += 1;
                time::sleep(self.retry_delay).await;
            }
            Err(DriverError::NoUsableHost.into())
        })
    }
}

/// Preference-ordered selection delegating to [`RandomStrategy`].
///
/// The preference list is a soft ordering, not a constraint: entries that
/// are unknown, registered unusable or unreachable are passed over, and once
/// the list is exhausted the fallback takes over the full candidate set. A
/// pick succeeds whenever any eligible candidate exists anywhere.
pub struct AffinityStrategy {
    affinity: Option<Vec<String>>,
    fallback: RandomStrategy,
}

impl AffinityStrategy {
    /// Parse the comma-separated preference list once. `None` or an empty
    /// string degrades to pure delegation.
    pub fn new(affinity: Option<&str>, fallback: RandomStrategy) -> AffinityStrategy {
        let affinity = affinity
            .map(str::trim)
            .filter(|list| !list.is_empty())
            .map(|list| list.split(',').map(|host| host.trim().to_string()).collect());
        AffinityStrategy { affinity, fallback }
    }
}

impl<T: Connector> SelectionStrategy<T> for AffinityStrategy {
    fn pick<'a>(
        &'a self,
        connector: &'a T,
        cx: PickContext<'a, T::Conn>,
    ) -> BoxFuture<'a, Result<T::Conn>> {
        Box::pin(async move {
            let order = match &self.affinity {
                Some(order) => order,
                None => return self.fallback.pick(connector, cx).await,
            };

            for host in order {
                // Hosts dropped from the configuration keep their list entry;
                // the registry takes precedence over live-connection reuse.
                if !cx.hosts.contains(host) || cx.registry.contains(host) {
                    continue;
                }
                if let Some(conn) = cx.live.get(host.as_str()) {
                    return Ok(conn.clone());
                }
                match connector.connect(host).await {
                    Ok(conn) => {
                        debug!("connected to preferred host {}", host);
                        return Ok(conn);
                    }
                    Err(err) => {
                        if connector.is_fatal(&err) {
                            cx.registry.mark(host);
                        }
                        warn!("preferred host {} failed: {}", host, err);
                    }
                }
            }

            self.fallback.pick(connector, cx).await
        })
    }
}
