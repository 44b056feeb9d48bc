use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("TransactionError - Rpc: {0}")]
    Rpc(#[from] RpcError),
    #[error("TransactionError - CouldNotDecodeTransaction: {0}")]
    CouldNotDecodeTransaction(#[from] serde_json::Error),
    #[error("TransactionError - SourceTransactionNotFound: {0}")]
    SourceTransactionNotFound(String),
    #[error("TransactionError - SourceOutputNotFound: {txid}:{vout}")]
    SourceOutputNotFound { txid: String, vout: u32 },
}
