use std::collections::VecDeque;
use std::sync::Arc;

use log::warn;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::errors::DriverError;
use crate::protocol::aggregate::{MessageHandler, ReadControl};
use crate::protocol::packet::ServerMessage;

/// Event delivered by the codec layer: a decoded message or a transport
/// failure. Closing the channel signals an orderly transport shutdown.
pub type StreamEvent = std::result::Result<ServerMessage, DriverError>;

struct QueueState {
    handlers: VecDeque<Box<dyn MessageHandler>>,
    closed: bool,
}

/// Queue of per-statement handlers served by one reader, in submission order.
///
/// Once the reader terminates the queue is closed: a handler pushed
/// afterwards is immediately notified of the closed transport instead of
/// lingering unresolved.
#[derive(Clone)]
pub struct HandlerQueue {
    inner: Arc<Mutex<QueueState>>,
}

impl HandlerQueue {
    pub fn new() -> HandlerQueue {
        HandlerQueue {
            inner: Arc::new(Mutex::new(QueueState {
                handlers: VecDeque::new(),
                closed: false,
            })),
        }
    }

    /// Append a handler for the next submitted statement.
    pub fn push(&self, mut handler: Box<dyn MessageHandler>) {
        let mut state = self.inner.lock();
        if state.closed {
            drop(state);
            handler.closed();
            return;
        }
        state.handlers.push_back(handler);
    }

    /// Number of statements still awaiting their result.
    pub fn len(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HandlerQueue {
    fn default() -> Self {
        HandlerQueue::new()
    }
}

/// Dispatch loop feeding connection events to the queued statement handlers.
///
/// Exactly one reader runs per connection. The front handler consumes
/// messages until it reports [`ReadControl::Done`]; the next queued handler
/// then takes over, which keeps concurrently submitted statements strictly
/// ordered. Handlers react synchronously and never suspend the loop.
pub struct MessageReader {
    events: mpsc::Receiver<StreamEvent>,
    handlers: HandlerQueue,
}

impl MessageReader {
    pub fn new(events: mpsc::Receiver<StreamEvent>, handlers: HandlerQueue) -> MessageReader {
        MessageReader { events, handlers }
    }

    /// Run until the event stream terminates. An orderly close notifies every
    /// outstanding handler through `closed`, a transport failure through
    /// `transport_error`; either way the queue rejects late arrivals.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                Ok(msg) => {
                    let mut state = self.handlers.inner.lock();
                    match state.handlers.front_mut() {
                        Some(handler) => {
                            if let ReadControl::Done = handler.message(msg) {
                                state.handlers.pop_front();
                            }
                        }
                        None => warn!("dropping {} message: no statement awaits it", msg.kind()),
                    }
                }
                Err(err) => {
                    warn!("transport failure on connection: {}", err);
                    let drained = {
                        let mut state = self.handlers.inner.lock();
                        state.closed = true;
                        state.handlers.drain(..).collect::<Vec<_>>()
                    };
                    for mut handler in drained {
                        handler.transport_error(err.clone().into());
                    }
                    return;
                }
            }
        }

        let drained = {
            let mut state = self.handlers.inner.lock();
            state.closed = true;
            state.handlers.drain(..).collect::<Vec<_>>()
        };
        for mut handler in drained {
            handler.closed();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::{DriverError, Error};
    use crate::protocol::aggregate::StatementOkHandler;
    use crate::protocol::packet::{Notice, ScalarValue, SessionStateParam};

    fn spawn_reader(capacity: usize) -> (mpsc::Sender<StreamEvent>, HandlerQueue) {
        let (tx, rx) = mpsc::channel(capacity);
        let handlers = HandlerQueue::new();
        tokio::spawn(MessageReader::new(rx, handlers.clone()).run());
        (tx, handlers)
    }

    fn queued_ok_handler(
        handlers: &HandlerQueue,
    ) -> crate::sync::Completion<crate::protocol::packet::StatementOk> {
        let handler = StatementOkHandler::new();
        let completion = handler.completion();
        handlers.push(Box::new(handler));
        completion
    }

    #[tokio::test]
    async fn statements_resolve_in_submission_order() {
        let (events, handlers) = spawn_reader(8);
        let first = queued_ok_handler(&handlers);
        let second = queued_ok_handler(&handlers);

        // First statement: one notice, then its terminal frame.
        events
            .send(Ok(ServerMessage::Notice(Notice::SessionStateChanged {
                param: SessionStateParam::RowsAffected,
                value: ScalarValue::Uint(2),
            })))
            .await
            .unwrap();
        events.send(Ok(ServerMessage::StmtExecuteOk)).await.unwrap();
        // Second statement completes without notices.
        events.send(Ok(ServerMessage::StmtExecuteOk)).await.unwrap();

        assert_eq!(first.await.unwrap().rows_affected, 2);
        assert_eq!(second.await.unwrap().rows_affected, 0);
        assert!(handlers.is_empty());
    }

    #[tokio::test]
    async fn orderly_close_fails_outstanding_statements() {
        let (events, handlers) = spawn_reader(8);
        let pending = queued_ok_handler(&handlers);

        drop(events);

        match pending.await {
            Err(Error::Driver(err)) => assert_eq!(*err, DriverError::ConnectionClosed),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn transport_failure_fans_out_to_all_handlers() {
        let (events, handlers) = spawn_reader(8);
        let first = queued_ok_handler(&handlers);
        let second = queued_ok_handler(&handlers);

        events
            .send(Err(DriverError::Transport {
                kind: std::io::ErrorKind::BrokenPipe,
                message: "broken pipe".into(),
            }))
            .await
            .unwrap();

        for pending in vec![first, second] {
            match pending.await {
                Err(Error::Driver(err)) => {
                    assert!(matches!(*err, DriverError::Transport { .. }))
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn push_after_close_resolves_immediately() {
        let (events, handlers) = spawn_reader(8);
        drop(events);

        // Let the reader observe the closed stream before pushing.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let late = queued_ok_handler(&handlers);
        match late.await {
            Err(Error::Driver(err)) => assert_eq!(*err, DriverError::ConnectionClosed),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn message_without_handler_is_dropped() {
        let (events, handlers) = spawn_reader(8);

        events.send(Ok(ServerMessage::FetchDone)).await.unwrap();

        // A handler queued afterwards still serves the next statement.
        let pending = queued_ok_handler(&handlers);
        events.send(Ok(ServerMessage::StmtExecuteOk)).await.unwrap();
        assert!(pending.await.is_ok());
    }
}
