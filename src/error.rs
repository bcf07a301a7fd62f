use thiserror::Error;

/// Failures surfaced by the escrow engine.
///
/// Every variant maps to one stable code (see [`EscrowError::code`]) so callers
/// can branch on the failure reason without matching on message text.
#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("caller is not authorized for this transition")]
    Unauthorized,
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("invalid state for {id}: {found} does not permit this transition")]
    InvalidState { id: String, found: String },
    #[error("batch member mismatch: {0}")]
    BatchMemberMismatch(String),
    #[error("batch has no members")]
    EmptyBatch,
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("sender and recipient must differ")]
    SelfPayment,
    #[error("settlement failed: {0}")]
    Settlement(String),
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("input error: {0}")]
    Input(String),
}

impl EscrowError {
    /// Stable numeric code for this failure.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unauthorized => 100,
            Self::NotFound { .. } => 101,
            Self::AlreadyExists { .. } => 102,
            Self::InvalidState { .. } => 103,
            Self::BatchMemberMismatch(_) => 104,
            Self::EmptyBatch => 105,
            Self::InvalidIdentifier(_) => 106,
            Self::InvalidAmount => 107,
            Self::SelfPayment => 108,
            Self::Settlement(_) => 120,
            Self::Storage(_) => 500,
            Self::Input(_) => 501,
        }
    }

    /// Stable symbolic name for this failure.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthorized => "ERR_UNAUTHORIZED",
            Self::NotFound { .. } => "ERR_NOT_FOUND",
            Self::AlreadyExists { .. } => "ERR_ALREADY_EXISTS",
            Self::InvalidState { .. } => "ERR_INVALID_STATE",
            Self::BatchMemberMismatch(_) => "ERR_BATCH_MEMBER_MISMATCH",
            Self::EmptyBatch => "ERR_EMPTY_BATCH",
            Self::InvalidIdentifier(_) => "ERR_INVALID_IDENTIFIER",
            Self::InvalidAmount => "ERR_INVALID_AMOUNT",
            Self::SelfPayment => "ERR_SELF_PAYMENT",
            Self::Settlement(_) => "ERR_SETTLEMENT",
            Self::Storage(_) => "ERR_STORAGE",
            Self::Input(_) => "ERR_INPUT",
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        Self::Storage(Box::new(std::io::Error::other(message.into())))
    }
}

impl From<std::io::Error> for EscrowError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

impl From<serde_json::Error> for EscrowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

impl From<csv::Error> for EscrowError {
    fn from(err: csv::Error) -> Self {
        Self::Input(err.to_string())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EscrowError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, EscrowError>;
