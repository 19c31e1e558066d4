use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("recipe `{0}` not found")]
    NotFound(String),
    #[error("storage fault: {0}")]
    Storage(#[from] sled::Error),
    #[error("record encoding fault: {0}")]
    Encoding(#[from] bincode::Error),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Faults of the persistence layer itself, as opposed to caller mistakes.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Encoding(_))
    }
}
