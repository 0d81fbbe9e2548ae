use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{Future, TryFutureExt};
use log::debug;
use tokio::sync::mpsc;
use tokio::time;

use crate::connection::ManagedConnection;
use crate::errors::{DriverError, Result};
use crate::protocol::aggregate::StatementOkHandler;
use crate::protocol::packet::StatementOk;
use crate::protocol::reader::{HandlerQueue, MessageReader, StreamEvent};
use crate::protocol::statement::Statement;

/// Wait future result with timeout
pub(crate) fn with_timeout<F, T>(fut: F, timeout: Duration) -> impl Future<Output = Result<T>>
where
    F: Future<Output = Result<T>>,
{
    time::timeout(timeout, fut).map_ok_or_else(
        |_| Err(crate::errors::DriverError::ConnectionTimeout.into()),
        |ok| ok,
    )
}

struct Inner {
    host: String,
    requests: mpsc::Sender<Statement>,
    handlers: HandlerQueue,
    execute_timeout: Duration,
}

/// Cloneable handle to one established server connection.
///
/// A connection is two channels handed over by the transport layer:
/// `requests` feeds statements to the codec writer, and the paired
/// [`MessageReader`] distributes decoded server messages to the statement
/// submitted first. Clones share both, so the pool keeps one handle per host
/// and gives out copies.
pub struct Connection {
    inner: Arc<Inner>,
}

impl Clone for Connection {
    fn clone(&self) -> Connection {
        Connection {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.inner.host)
            .field("pending", &self.inner.handlers.len())
            .finish()
    }
}

impl Connection {
    /// Bind a connection handle to the channel pair of an established
    /// transport. Returns the handle together with the reader loop, which
    /// the caller spawns onto its runtime.
    pub fn bind(
        host: impl Into<String>,
        requests: mpsc::Sender<Statement>,
        events: mpsc::Receiver<StreamEvent>,
        execute_timeout: Duration,
    ) -> (Connection, MessageReader) {
        let handlers = HandlerQueue::new();
        let reader = MessageReader::new(events, handlers.clone());
        let conn = Connection {
            inner: Arc::new(Inner {
                host: host.into(),
                requests,
                handlers,
                execute_timeout,
            }),
        };
        (conn, reader)
    }

    /// Host this connection talks to.
    #[inline]
    pub fn host(&self) -> &str {
        &self.inner.host
    }

    /// Number of statements awaiting their result on this connection.
    #[inline]
    pub fn pending(&self) -> usize {
        self.inner.handlers.len()
    }

    /// Submit a statement and await its final status.
    ///
    /// A timeout abandons the statement; the connection can no longer pair
    /// replies with submissions after that and should be discarded.
    pub async fn execute(&self, stmt: impl Into<Statement>) -> Result<StatementOk> {
        let stmt = stmt.into();
        let handler = StatementOkHandler::new();
        let completion = handler.completion();

        self.inner.handlers.push(Box::new(handler));
        debug!("submitting statement to {}", self.inner.host);
        if self.inner.requests.send(stmt).await.is_err() {
            return Err(DriverError::ConnectionClosed.into());
        }

        with_timeout(completion, self.inner.execute_timeout).await
    }
}

impl ManagedConnection for Connection {
    fn host(&self) -> &str {
        &self.inner.host
    }

    fn is_alive(&self) -> bool {
        !self.inner.requests.is_closed()
    }
}
