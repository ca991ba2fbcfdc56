use std::fmt;

/// Invalid transition of a Unit-of-Work's transaction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransactionStateError {
    #[error("a transaction is already active on this unit of work")]
    AlreadyActive,

    #[error("no transaction is active on this unit of work")]
    NotActive,

    #[error("the transaction belongs to the enclosing command scope")]
    ManagedByScope,
}

/// Error type shared by the Unit-of-Work, repositories and services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("a command scope is already active in this call chain")]
    Reentrancy,

    #[error("Transaction state error: {0}")]
    TransactionState(#[from] TransactionStateError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification consumed by outer layers (e.g. an HTTP adapter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Reentrancy,
    TransactionState,
    NotFound,
    BusinessRule,
    Store,
}

impl Error {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Reentrancy => ErrorKind::Reentrancy,
            Self::TransactionState(_) => ErrorKind::TransactionState,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::BusinessRule(_) => ErrorKind::BusinessRule,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Expected failures the caller can report back to a client; everything
    /// else is a programming or infrastructure fault.
    pub fn is_expected(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::BusinessRule)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reentrancy => "reentrancy",
            Self::TransactionState => "transaction_state",
            Self::NotFound => "not_found",
            Self::BusinessRule => "business_rule",
            Self::Store => "store",
        };
        f.write_str(name)
    }
}
