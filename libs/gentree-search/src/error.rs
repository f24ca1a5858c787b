use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Malformed user input. The message is meant for the client as-is.
    #[error("{0}")]
    InvalidArgument(String),

    /// A name/place parameter reached field resolution without an allow-list entry.
    #[error("search parameter '{0}' has no indexed field")]
    UnknownField(String),

    #[error("collection error: {0}")]
    Collection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SearchError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn collection<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Collection(error.into())
    }

    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
