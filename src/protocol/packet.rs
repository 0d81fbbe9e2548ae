use crate::errors::ServerError;

/// Severity attached to a warning notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Note,
    Warning,
    Error,
}

/// Diagnostic the server attaches to a statement without failing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub level: NoticeSeverity,
    pub code: u32,
    pub message: String,
}

/// Session-state parameter tags carried by state-change notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStateParam {
    CurrentSchema,
    AccountExpired,
    GeneratedInsertId,
    RowsAffected,
    ProducedMessage,
    RowsFound,
    RowsMatched,
    TrxCommitted,
    TrxRolledback,
    /// Tag outside the known set, kept with its raw wire code.
    Unrecognized(u32),
}

/// Scalar payload of a session-state notice.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Uint(u64),
    Int(i64),
    Str(String),
}

impl ScalarValue {
    /// Unsigned view of the value; `None` when the payload is not unsigned.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ScalarValue::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

/// Notice frame payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Warning(Warning),
    SessionStateChanged {
        param: SessionStateParam,
        value: ScalarValue,
    },
    /// Notice frame of a type this driver does not know.
    Unrecognized { kind: u32 },
}

/// Messages the codec layer delivers for one connection, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Notice(Notice),
    /// Terminal success frame of a statement.
    StmtExecuteOk,
    /// Terminal error frame of a statement.
    Error(ServerError),
    /// All rows of the current fetch were delivered.
    FetchDone,
    /// Result-set column metadata, owned by row consumers.
    ColumnMeta(Vec<u8>),
    /// Result-set row payload, owned by row consumers.
    Row(Vec<u8>),
}

impl ServerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Notice(_) => "notice",
            ServerMessage::StmtExecuteOk => "stmt-execute-ok",
            ServerMessage::Error(_) => "error",
            ServerMessage::FetchDone => "fetch-done",
            ServerMessage::ColumnMeta(_) => "column-meta",
            ServerMessage::Row(_) => "row",
        }
    }
}

/// Final status of a successfully executed statement.
///
/// Built incrementally from session-state notices; immutable once the
/// terminal frame arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOk {
    pub rows_affected: u64,
    pub last_insert_id: Option<u64>,
    pub warnings: Vec<Warning>,
}
