//! Errors returned by the marketplace service.

use catalog::CatalogError;

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Recommendation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ServiceError {
    /// True for lookups of unknown users or courses
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::Catalog(CatalogError::NotFound { .. })
                | ServiceError::Catalog(CatalogError::MissingReference { .. })
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
