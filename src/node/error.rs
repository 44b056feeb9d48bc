use thiserror::Error;

use crate::{credentials::error::CredentialError, primitives::TxId, rpc::RpcError};

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("NodeError - Rpc: {0}")]
    Rpc(#[from] RpcError),
    #[error("NodeError - CouldNotDecodeResponse: {0}")]
    CouldNotDecodeResponse(#[from] serde_json::Error),
    #[error("NodeError - Credential: {0}")]
    Credential(#[from] CredentialError),
    #[error("NodeError - WalletLockFailed: {source}")]
    WalletLockFailed {
        source: RpcError,
        tx_id: Option<TxId>,
    },
}
