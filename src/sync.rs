//! Task synchronization primitives shared between the reader side that
//! resolves statement results and the caller side that awaits them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use parking_lot::{Condvar, Mutex};

use crate::errors::{DriverError, Error, Result};

enum State<T> {
    Pending(Vec<Waker>),
    Ready(Option<Result<T>>),
}

struct Shared<T> {
    state: Mutex<State<T>>,
    done: Condvar,
}

/// Single-assignment completion cell.
///
/// One clone is held by the party producing the result (a message handler),
/// the other by the party consuming it. The first resolution wins; every
/// later `complete`/`fail` attempt is discarded, which makes races between a
/// terminal frame and a transport shutdown harmless. The value is consumed
/// exactly once, either by `.await` or by [`Completion::wait`]; a second
/// consumption reports [`DriverError::ResultConsumed`].
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Completion<T> {
        Completion {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Completion<T> {
    pub fn new() -> Completion<T> {
        Completion {
            shared: Arc::new(Shared {
                state: Mutex::new(State::Pending(Vec::new())),
                done: Condvar::new(),
            }),
        }
    }

    /// Resolve with a success value. Returns `false` if the cell was already
    /// resolved.
    pub fn complete(&self, value: T) -> bool {
        self.resolve(Ok(value))
    }

    /// Resolve with an error. Returns `false` if the cell was already
    /// resolved.
    pub fn fail(&self, err: Error) -> bool {
        self.resolve(Err(err))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(&*self.shared.state.lock(), State::Ready(_))
    }

    fn resolve(&self, result: Result<T>) -> bool {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Pending(wakers) => {
                let wakers = std::mem::take(wakers);
                *state = State::Ready(Some(result));
                drop(state);
                self.shared.done.notify_all();
                for waker in wakers {
                    waker.wake();
                }
                true
            }
            State::Ready(_) => false,
        }
    }

    /// Block the current thread until the cell is resolved and take the
    /// value. Intended for synchronous callers; async callers `.await` the
    /// cell instead.
    pub fn wait(&self) -> Result<T> {
        let mut state = self.shared.state.lock();
        loop {
            match &mut *state {
                State::Ready(slot) => {
                    return slot
                        .take()
                        .unwrap_or_else(|| Err(DriverError::ResultConsumed.into()));
                }
                State::Pending(_) => self.shared.done.wait(&mut state),
            }
        }
    }
}

impl<T> Future for Completion<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let me = self.get_mut();
        let mut state = me.shared.state.lock();
        match &mut *state {
            State::Ready(slot) => Poll::Ready(
                slot.take()
                    .unwrap_or_else(|| Err(DriverError::ResultConsumed.into())),
            ),
            State::Pending(wakers) => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn first_resolution_wins() {
        let cell = Completion::new();
        assert!(cell.complete(1u32));
        assert!(!cell.complete(2));
        assert!(!cell.fail(DriverError::ConnectionClosed.into()));
        assert!(cell.is_resolved());
        assert_eq!(cell.wait().unwrap(), 1);
    }

    #[test]
    fn error_then_success_keeps_error() {
        let cell = Completion::<u32>::new();
        assert!(cell.fail(DriverError::ConnectionClosed.into()));
        assert!(!cell.complete(9));
        match cell.wait() {
            Err(Error::Driver(err)) => assert_eq!(*err, DriverError::ConnectionClosed),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn second_consume_reports() {
        let cell = Completion::new();
        cell.complete(7u32);
        assert_eq!(cell.wait().unwrap(), 7);
        match cell.wait() {
            Err(Error::Driver(err)) => assert_eq!(*err, DriverError::ResultConsumed),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn concurrent_resolvers_single_winner() {
        let cell = Completion::new();
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let cell = cell.clone();
                thread::spawn(move || cell.complete(i))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(cell.wait().unwrap() < 8);
    }

    #[test]
    fn wait_blocks_until_resolved() {
        let cell = Completion::new();
        let resolver = cell.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            resolver.complete(42u32);
        });
        assert_eq!(cell.wait().unwrap(), 42);
        handle.join().unwrap();
    }

    #[tokio::test]
    async fn await_resolution() {
        let cell = Completion::<u32>::new();
        let resolver = cell.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1)).await;
            resolver.complete(5);
        });
        assert_eq!(cell.await.unwrap(), 5);
    }
}
