use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Debug, Error)]
pub enum FeeEstimationError {
    #[error("FeeEstimationError - Rpc: {0}")]
    Rpc(#[from] RpcError),
    #[error("FeeEstimationError - CouldNotDecodeResponseBody: {0}")]
    CouldNotDecodeResponseBody(#[from] serde_json::Error),
    #[error("FeeEstimationError - NoFeeRate: node returned no estimate for {0} blocks")]
    NoFeeRate(u16),
}
