use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] kbase_vector_store::VectorStoreError),

    #[error("Empty query")]
    EmptyQuery,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SearchError {
    /// True when the embedding backend could not serve the request
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(
            self,
            Self::VectorStoreError(kbase_vector_store::VectorStoreError::ProviderUnavailable(_))
        )
    }
}
