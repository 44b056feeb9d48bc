use serde_json::{json, Map, Value};

use std::{collections::BTreeMap, ops::Range};

use super::entity::PayoutRequest;
use crate::primitives::Satoshis;

/// A contiguous run of the payout queue paid by a single `sendmany`.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutBatch {
    members: Range<usize>,
    outputs: BTreeMap<String, Satoshis>,
    value: Satoshis,
}

impl PayoutBatch {
    /// Dequeue the next batch from the front of `pending`.
    ///
    /// Requests are added first and the limits checked afterwards, so a batch
    /// always holds at least one request and may overshoot `max_value` by the
    /// last request added. `offset` is the queue position of `pending[0]`.
    pub fn take_next(
        pending: &[PayoutRequest],
        offset: usize,
        max_value: Satoshis,
        max_outputs: usize,
    ) -> Self {
        let cap = max_outputs.min(pending.len()).max(1);
        let mut outputs = BTreeMap::new();
        let mut value = Satoshis::ZERO;
        let mut n_members = 0;
        for request in pending {
            *outputs
                .entry(request.address.clone())
                .or_insert(Satoshis::ZERO) += request.satoshis;
            value += request.satoshis;
            n_members += 1;
            if value >= max_value || n_members >= cap {
                break;
            }
        }
        Self {
            members: offset..offset + n_members,
            outputs,
            value,
        }
    }

    pub fn members(&self) -> Range<usize> {
        self.members.clone()
    }

    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    pub fn outputs(&self) -> &BTreeMap<String, Satoshis> {
        &self.outputs
    }

    pub fn into_outputs(self) -> BTreeMap<String, Satoshis> {
        self.outputs
    }

    pub fn value(&self) -> Satoshis {
        self.value
    }

    /// True when two members pay the same address and share one output.
    pub fn has_merged_outputs(&self) -> bool {
        self.outputs.len() < self.members.len()
    }

    pub(super) fn send_many_args(&self) -> Vec<Value> {
        let amounts: Map<String, Value> = self
            .outputs
            .iter()
            .map(|(address, sats)| (address.clone(), sats.to_btc_json()))
            .collect();
        vec![json!(""), Value::Object(amounts)]
    }
}

/// Partition `requests` the same way `pay_many` will, without sending anything.
pub fn plan_batches(
    requests: &[PayoutRequest],
    max_value: Satoshis,
    max_outputs: usize,
) -> Vec<PayoutBatch> {
    let mut batches = Vec::new();
    let mut cursor = 0;
    while cursor < requests.len() {
        let batch = PayoutBatch::take_next(&requests[cursor..], cursor, max_value, max_outputs);
        cursor = batch.members.end;
        batches.push(batch);
    }
    batches
}
