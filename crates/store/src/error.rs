use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("database error: {0}")]
    Other(#[source] sqlx::Error),
}

pub(crate) fn convert_error(why: sqlx::Error) -> StoreError {
    match why {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::Other(why),
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
