use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid question document: {0}")]
    Format(String),
    #[error("Source unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Invalid state: {0}")]
    State(&'static str),
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CoreError {
    pub(crate) fn bank_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Bank",
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}
