use uuid::Uuid;

/// Statement submitted over a connection.
#[derive(Debug, Clone)]
pub struct Statement {
    pub(crate) id: Option<Uuid>,
    pub(crate) text: String,
}

impl Statement {
    /// Client-generated statement id, if any.
    #[inline]
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Statement text as submitted by the caller.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        let id = Uuid::new_v4();
        Statement {
            id: Some(id),
            text: sql.into(),
        }
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::from(sql.as_str())
    }
}
