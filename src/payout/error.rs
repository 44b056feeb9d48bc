use thiserror::Error;

use super::entity::PayoutRequest;
use crate::{credentials::error::CredentialError, primitives::Satoshis, rpc::RpcError};

/// Every variant hands the payouts back. Before the wallet was unlocked they
/// are untouched and safe to retry.
#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("PayoutError - InvalidAmount: {address} {satoshis}")]
    InvalidAmount {
        address: String,
        satoshis: Satoshis,
        payouts: Vec<PayoutRequest>,
    },
    #[error("PayoutError - Credential: {source}")]
    Credential {
        source: CredentialError,
        payouts: Vec<PayoutRequest>,
    },
    #[error("PayoutError - WalletUnlockFailed: {source}")]
    WalletUnlockFailed {
        source: RpcError,
        payouts: Vec<PayoutRequest>,
    },
    #[error("PayoutError - WalletLockFailed: {source}")]
    WalletLockFailed {
        source: RpcError,
        payouts: Vec<PayoutRequest>,
    },
}

impl PayoutError {
    pub fn into_payouts(self) -> Vec<PayoutRequest> {
        match self {
            Self::InvalidAmount { payouts, .. }
            | Self::Credential { payouts, .. }
            | Self::WalletUnlockFailed { payouts, .. }
            | Self::WalletLockFailed { payouts, .. } => payouts,
        }
    }
}
