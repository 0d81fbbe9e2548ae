pub use crate::{
    client::Connection,
    connection::{Connector, ManagedConnection},
    pool::{
        options::Options,
        strategy::{AffinityStrategy, PickContext, RandomStrategy, SelectionStrategy},
        Pool, PoolBuilder, PoolInfo, UnavailableHosts,
    },
    protocol::{
        aggregate::{MessageHandler, ReadControl, StatementOkHandler},
        packet::{
            Notice, NoticeSeverity, ScalarValue, ServerMessage, SessionStateParam, StatementOk,
            Warning,
        },
        reader::{HandlerQueue, MessageReader, StreamEvent},
        statement::Statement,
    },
    sync::Completion,
};
pub mod errors {
    pub use crate::errors::*;
}
