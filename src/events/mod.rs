mod broadcast;

use serde::{Deserialize, Serialize};

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use crate::{primitives::*, rpc::RpcError};

pub use broadcast::*;

/// Notifications produced while paying out, in the order they happen.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayoutEvent {
    Unlocked {
        #[serde_as(as = "serde_with::DurationSeconds<u64>")]
        duration: Duration,
    },
    Locked,
    Success {
        outputs: BTreeMap<String, Satoshis>,
        tx_id: TxId,
    },
    Failure {
        outputs: BTreeMap<String, Satoshis>,
        error: RpcError,
    },
    Done,
}

pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: PayoutEvent);
}

pub type SharedEventSink = Arc<dyn EventSink>;

pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _: PayoutEvent) {}
}
