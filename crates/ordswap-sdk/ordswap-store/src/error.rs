use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("listing not found: {0}")]
    ListingNotFound(String),

    #[error("offer not found")]
    OfferNotFound,

    #[error("SDK error: {0}")]
    Sdk(#[from] ordswap_sdk::Error),
}
