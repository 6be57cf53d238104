use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// Inputs that reference coins the wallet does not hold are not errors and
/// never show up here.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("unknown asset id: {0}")]
    UnknownAsset(String),

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("invalid transaction id: {0}")]
    InvalidTxId(String),

    /// Reconciliation could not finish for the listed symbols. Their
    /// AssetBalances were left exactly as they were before the call.
    #[error("verification incomplete for {failed:?}: {source:#}")]
    Verification {
        failed: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::MalformedSnapshot(e.to_string())
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::MalformedSnapshot(e.to_string())
    }
}
