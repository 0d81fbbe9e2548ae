//! Boundary traits between the pool and the transport layer.
//!
//! The pool never opens sockets itself. It is generic over a [`Connector`]
//! provided by the transport layer, and everything it learns about an
//! established connection goes through [`ManagedConnection`].

use futures::future::BoxFuture;

use crate::errors::{Error, Result};

/// Established connection handle managed by the pool.
///
/// Handles are cheap to clone; every clone refers to the same underlying
/// channel, so the pool can keep one per host and give copies to callers.
pub trait ManagedConnection: Clone + Send + Sync + 'static {
    /// Host identifier this connection belongs to.
    fn host(&self) -> &str;

    /// Whether the underlying channel still accepts statements. Dead handles
    /// are evicted from the pool before selection.
    fn is_alive(&self) -> bool {
        true
    }
}

/// Connection factory and failure classifier supplied by the transport layer.
pub trait Connector: Send + Sync + 'static {
    type Conn: ManagedConnection;

    /// Establish a new connection to `host`.
    fn connect<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<Self::Conn>>;

    /// Classify a connection error. `true` means the host itself is suspect
    /// and gets registered as unusable; `false` leaves the host eligible for
    /// the next attempt.
    fn is_fatal(&self, err: &Error) -> bool;
}
