use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{primitives::*, rpc::RpcError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayoutOutcome {
    Sent { tx_id: TxId, vout: u32 },
    Failed { error: RpcError },
}

/// One logical payout. `outcome` is filled in exactly once by the batcher.
#[derive(Debug, Builder, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRequest {
    #[builder(setter(into), default = "PayoutId::new()")]
    #[serde(default = "PayoutId::new")]
    pub id: PayoutId,
    #[builder(setter(into))]
    pub address: String,
    #[builder(setter(into))]
    pub satoshis: Satoshis,
    #[builder(setter(skip))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PayoutOutcome>,
}

impl PayoutRequest {
    pub fn new(address: impl Into<String>, satoshis: impl Into<Satoshis>) -> Self {
        Self {
            id: PayoutId::new(),
            address: address.into(),
            satoshis: satoshis.into(),
            outcome: None,
        }
    }

    pub fn builder() -> PayoutRequestBuilder {
        PayoutRequestBuilder::default()
    }

    pub fn tx_id(&self) -> Option<&str> {
        match &self.outcome {
            Some(PayoutOutcome::Sent { tx_id, .. }) => Some(tx_id),
            _ => None,
        }
    }

    pub fn vout(&self) -> Option<u32> {
        match &self.outcome {
            Some(PayoutOutcome::Sent { vout, .. }) => Some(*vout),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RpcError> {
        match &self.outcome {
            Some(PayoutOutcome::Failed { error }) => Some(error),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome.is_some()
    }

    /// Amounts must be a whole, non-negative number of satoshis.
    pub fn has_valid_amount(&self) -> bool {
        !self.satoshis.is_negative() && self.satoshis.is_whole()
    }

    pub(super) fn record(&mut self, outcome: PayoutOutcome) {
        debug_assert!(self.outcome.is_none(), "payout outcome recorded twice");
        self.outcome = Some(outcome);
    }
}
