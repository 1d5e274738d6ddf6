use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("inscription {0} not found in seller address")]
    InscriptionNotFound(String),

    #[error("insufficient funds: {available} sat available, {required} sat required")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("unsupported wallet type: {0}")]
    UnsupportedWalletType(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("malformed oracle response: {0}")]
    OracleData(String),

    #[error("PSBT construction error: {0}")]
    Psbt(String),

    #[error("PSBT decoding error: {0}")]
    PsbtDecode(String),

    #[error("fee percent must be at most 100 (got {0})")]
    InvalidFeePercent(u64),
}

pub type Result<T> = std::result::Result<T, Error>;
