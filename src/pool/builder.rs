use std::convert::{TryFrom, TryInto};

use crate::connection::Connector;
use crate::errors::{Result, UrlError};

use super::{Options, Pool};

/// Connection pool builder
///
/// # Example
/// `
/// let pool = PoolBuilder::default()
///    .with_database("default")
///    .with_username("default")
///    .add_addr("db1.example.com:33060")
///    .add_addr("db2.example.com:33060")
///    .with_affinity("db2.example.com:33060")
///    .build(connector)
///    .unwrap();
/// `
pub struct PoolBuilder {
    addr: Vec<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    affinity: Option<String>,
}

impl TryFrom<PoolBuilder> for Options {
    type Error = UrlError;

    fn try_from(mut value: PoolBuilder) -> std::result::Result<Self, UrlError> {
        if value.addr.is_empty() {
            return Err(UrlError::Invalid);
        }

        let mut options = crate::DEF_OPTIONS.clone();
        std::mem::swap(&mut options.addr, &mut value.addr);
        if let Some(username) = value.username {
            options.username = username;
        }
        if let Some(password) = value.password {
            options.password = password;
        }
        if let Some(database) = value.database {
            options.database = database;
        }
        options.affinity = value.affinity;
        Ok(options)
    }
}

impl PoolBuilder {
    /// Set the username that is used in authentication
    #[inline]
    pub fn with_username(mut self, value: impl ToString) -> Self {
        self.username = Some(value.to_string());
        self
    }

    /// Set the default database that is used in statement processing if
    /// the statement doesn't explicitly specify another database name
    #[inline]
    pub fn with_database(mut self, value: impl ToString) -> Self {
        self.database = Some(value.to_string());
        self
    }

    /// Set password that is used in authentication
    #[inline]
    pub fn with_password(mut self, value: impl ToString) -> Self {
        self.password = Some(value.to_string());
        self
    }

    /// Set the ordered comma-separated list of preferred hosts. Selection
    /// walks it first and only then falls back to the remaining candidates.
    #[inline]
    pub fn with_affinity(mut self, value: impl ToString) -> Self {
        self.affinity = Some(value.to_string());
        self
    }

    /// Add a cluster host address.
    ///
    /// Address must have domain name and port number. A pool can have
    /// multiple addresses; without an affinity list the next connection
    /// picks any reachable one.
    #[inline]
    pub fn add_addr(mut self, value: impl ToString) -> Self {
        self.addr.push(value.to_string());
        self
    }

    /// Convert the Builder into Pool using specified options.
    /// Note! The created pool has no connection; the first one is
    /// established by `pool.connection()`.
    #[inline]
    pub fn build<T: Connector>(self, connector: T) -> Result<Pool<T>> {
        let options: Options = self.try_into()?;
        Pool::with_options(options, connector)
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        PoolBuilder {
            addr: Vec::new(),
            username: None,
            password: None,
            database: None,
            affinity: None,
        }
    }
}
