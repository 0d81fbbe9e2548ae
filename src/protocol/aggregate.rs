use log::warn;

use crate::errors::{DriverError, Error};
use crate::protocol::packet::{
    Notice, ScalarValue, ServerMessage, SessionStateParam, StatementOk, Warning,
};
use crate::sync::Completion;

/// Verdict a handler returns to the reader after each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadControl {
    /// The handler expects more messages for its statement.
    Continue,
    /// The statement reached a terminal state; drop the handler and move on
    /// to the next queued one.
    Done,
}

/// Per-statement consumer of the connection message stream.
///
/// The reader feeds messages in strict arrival order and never blocks on a
/// handler; implementations must react and return. Once a handler resolves
/// its statement it reports [`ReadControl::Done`] and is dropped; transport
/// termination reaches every still-queued handler through [`closed`] or
/// [`transport_error`].
///
/// [`closed`]: MessageHandler::closed
/// [`transport_error`]: MessageHandler::transport_error
pub trait MessageHandler: Send {
    /// Process the next message of the stream.
    fn message(&mut self, msg: ServerMessage) -> ReadControl;

    /// The transport closed before the handler finished.
    fn closed(&mut self);

    /// The transport failed before the handler finished.
    fn transport_error(&mut self, err: Error);
}

/// Accumulates the status notices of one statement and resolves its
/// completion with a [`StatementOk`] (or an error) exactly once.
pub struct StatementOkHandler {
    rows_affected: u64,
    last_insert_id: Option<u64>,
    warnings: Vec<Warning>,
    completion: Completion<StatementOk>,
}

impl StatementOkHandler {
    pub fn new() -> StatementOkHandler {
        StatementOkHandler {
            rows_affected: 0,
            last_insert_id: None,
            warnings: Vec::new(),
            completion: Completion::new(),
        }
    }

    /// Completion observed by the caller that submitted the statement.
    pub fn completion(&self) -> Completion<StatementOk> {
        self.completion.clone()
    }

    fn session_state(&mut self, param: SessionStateParam, value: ScalarValue) {
        match param {
            SessionStateParam::GeneratedInsertId => match value.as_uint() {
                Some(v) => self.last_insert_id = Some(v),
                None => warn!("generated-insert-id notice with non-integer payload: {:?}", value),
            },
            SessionStateParam::RowsAffected => match value.as_uint() {
                Some(v) => self.rows_affected = v,
                None => warn!("rows-affected notice with non-integer payload: {:?}", value),
            },
            SessionStateParam::ProducedMessage => {}
            other => warn!("unhandled session state notice: {:?}", other),
        }
    }
}

impl Default for StatementOkHandler {
    fn default() -> Self {
        StatementOkHandler::new()
    }
}

impl MessageHandler for StatementOkHandler {
    fn message(&mut self, msg: ServerMessage) -> ReadControl {
        match msg {
            ServerMessage::Notice(Notice::Warning(w)) => {
                self.warnings.push(w);
                ReadControl::Continue
            }
            ServerMessage::Notice(Notice::SessionStateChanged { param, value }) => {
                self.session_state(param, value);
                ReadControl::Continue
            }
            ServerMessage::Notice(Notice::Unrecognized { kind }) => {
                warn!("unknown notice type {}", kind);
                ReadControl::Continue
            }
            ServerMessage::StmtExecuteOk => {
                let ok = StatementOk {
                    rows_affected: self.rows_affected,
                    last_insert_id: self.last_insert_id,
                    warnings: std::mem::take(&mut self.warnings),
                };
                self.completion.complete(ok);
                ReadControl::Done
            }
            ServerMessage::Error(err) => {
                self.completion.fail(err.into());
                ReadControl::Done
            }
            ServerMessage::FetchDone => ReadControl::Continue,
            // Result-set traffic belongs to row consumers; in place of a
            // statement result it is a protocol violation.
            msg @ ServerMessage::ColumnMeta(_) | msg @ ServerMessage::Row(_) => {
                self.completion
                    .fail(DriverError::UnexpectedMessage { kind: msg.kind() }.into());
                ReadControl::Done
            }
        }
    }

    fn closed(&mut self) {
        self.completion.fail(DriverError::ConnectionClosed.into());
    }

    fn transport_error(&mut self, err: Error) {
        self.completion.fail(err);
    }
}
