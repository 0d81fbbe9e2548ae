use std::{borrow::Cow, io, result};

use thiserror::Error;
use url::ParseError;

/// This type represents an error frame the server sends in place of a
/// statement result.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
#[error("[{}] ({}) {}", code, sql_state, message)]
pub struct ServerError {
    pub code: u32,
    pub sql_state: String,
    pub message: String,
}

/// This type enumerates configuration URL errors.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum UrlError {
    #[error("Invalid or incomplete connection URL")]
    Invalid,

    #[error("Invalid value `{}' for connection URL parameter `{}'.", value, param)]
    InvalidParamValue { param: String, value: String },

    #[error("URL parse error: {}", _0)]
    Parse(#[source] ParseError),

    #[error("Unknown connection URL parameter `{}'.", param)]
    UnknownParameter { param: String },

    #[error("Unsupported connection URL scheme `{}'.", scheme)]
    UnsupportedScheme { scheme: String },
}

/// This type enumerates driver own errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DriverError {
    #[error("Connection to the server is closed.")]
    ConnectionClosed,

    #[error("Connection timeout.")]
    ConnectionTimeout,

    #[error("No usable host among the configured candidates.")]
    NoUsableHost,

    #[error("Unexpected message `{}' in place of a statement result.", kind)]
    UnexpectedMessage { kind: &'static str },

    #[error("Transport failure: {}.", message)]
    Transport {
        kind: io::ErrorKind,
        message: String,
    },

    #[error("Statement result already consumed.")]
    ResultConsumed,
}

/// Consolidation of errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("Driver error: `{}'", _0)]
    Driver(#[source] Box<DriverError>),

    #[error("io error: `{}`", _0)]
    Io(#[source] io::Error),

    #[error("Server error: `{}'", _0)]
    Server(#[source] ServerError),

    #[error("URL error: `{}'", _0)]
    Url(#[source] UrlError),

    #[error("Other error: `{}`", _0)]
    Other(Cow<'static, str>),
}

impl Error {
    pub fn is_timeout(&self) -> bool {
        if let Error::Driver(berr) = self {
            **berr == DriverError::ConnectionTimeout
        } else {
            false
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Error::Server(_))
    }
}

pub type Result<T> = result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for UrlError {
    fn from(err: ParseError) -> Self {
        UrlError::Parse(err)
    }
}

/// NotAnError
impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::Other(Cow::Borrowed(""))
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Url(err.into())
    }
}

impl From<DriverError> for Error {
    fn from(err: DriverError) -> Self {
        Error::Driver(Box::new(err))
    }
}

impl From<ServerError> for Error {
    fn from(err: ServerError) -> Self {
        Error::Server(err)
    }
}

impl From<UrlError> for Error {
    fn from(err: UrlError) -> Self {
        Error::Url(err)
    }
}

impl From<&'static str> for Error {
    fn from(err: &'static str) -> Self {
        Error::Other(Cow::Borrowed(err))
    }
}
