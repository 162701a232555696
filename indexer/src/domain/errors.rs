use thiserror::Error;

use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::rpc::RpcClientError;

/// Error type for transaction ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    /// A store write failed; the ledger unit was rolled back
    #[error("Store error: {0}")]
    Store(#[from] DbError),
    /// A block arrived below the height already committed
    #[error("Block {height} submitted after block {last} was ingested")]
    OutOfOrder { height: u64, last: u64 },
    /// An earlier write in the same block failed and its unit was rolled back
    #[error("Batch for block {height} was abandoned after a failed write")]
    Abandoned { height: u64 },
}

/// Error type for transaction lookups
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcClientError),
    #[error("Malformed RPC response: {0}")]
    Malformed(String),
}

/// Error type for the chain sync loop
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcClientError),
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Malformed block {height}: {reason}")]
    MalformedBlock { height: u64, reason: String },
}
