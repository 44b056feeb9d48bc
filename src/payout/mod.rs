mod batch;
mod config;
mod entity;
pub mod error;

use tracing::instrument;

use crate::{
    credentials::SharedPassphraseSource,
    events::{PayoutEvent, SharedEventSink},
    primitives::*,
    rpc::{RpcError, SharedLedger},
    wallet_session::{ScopeError, WalletSession},
};

pub use batch::*;
pub use config::*;
pub use entity::*;
use error::PayoutError;

#[derive(Debug, Default, Clone, Copy)]
struct BatchSummary {
    n_batches: usize,
    n_failed_batches: usize,
}

/// Pays a queue of payouts through as few `sendmany` calls as the limits
/// allow, inside a single unlock of the node wallet.
///
/// Calls against the same wallet must not overlap; callers serialize them.
#[derive(Clone)]
pub struct PayoutBatcher {
    ledger: SharedLedger,
    events: SharedEventSink,
    passphrases: SharedPassphraseSource,
}

impl PayoutBatcher {
    pub fn new(
        ledger: SharedLedger,
        events: SharedEventSink,
        passphrases: SharedPassphraseSource,
    ) -> Self {
        Self {
            ledger,
            events,
            passphrases,
        }
    }

    #[instrument(
        name = "payouts.pay_many",
        skip_all,
        fields(n_payouts = requests.len(), n_batches, n_failed_batches),
        err
    )]
    pub async fn pay_many(
        &self,
        mut requests: Vec<PayoutRequest>,
        passphrase: Option<String>,
        limits: BatchLimits,
    ) -> Result<Vec<PayoutRequest>, PayoutError> {
        if requests.is_empty() {
            return Ok(requests);
        }
        let invalid = requests
            .iter()
            .find(|r| !r.has_valid_amount())
            .map(|r| (r.address.clone(), r.satoshis));
        if let Some((address, satoshis)) = invalid {
            return Err(PayoutError::InvalidAmount {
                address,
                satoshis,
                payouts: requests,
            });
        }
        let passphrase = match passphrase {
            Some(passphrase) => passphrase,
            None => match self.passphrases.passphrase().await {
                Ok(passphrase) => passphrase,
                Err(source) => {
                    return Err(PayoutError::Credential {
                        source,
                        payouts: requests,
                    })
                }
            },
        };

        let mut session = WalletSession::new(self.ledger.clone(), self.events.clone());
        let ledger = &self.ledger;
        let events = &self.events;
        let queue = &mut requests;
        let limits = &limits;
        let res = session
            .run_unlocked(&passphrase, limits.unlock_duration, || async move {
                send_batches(ledger, events, queue, limits).await
            })
            .await;

        match res {
            Ok(summary) => {
                record_summary(summary);
                self.events.emit(PayoutEvent::Done);
                Ok(requests)
            }
            Err(ScopeError::Unlock(source)) => Err(PayoutError::WalletUnlockFailed {
                source,
                payouts: requests,
            }),
            Err(ScopeError::Lock {
                source,
                value: summary,
            }) => {
                record_summary(summary);
                self.events.emit(PayoutEvent::Done);
                Err(PayoutError::WalletLockFailed {
                    source,
                    payouts: requests,
                })
            }
        }
    }
}

fn record_summary(summary: BatchSummary) {
    let span = tracing::Span::current();
    span.record("n_batches", summary.n_batches);
    span.record("n_failed_batches", summary.n_failed_batches);
}

async fn send_batches(
    ledger: &SharedLedger,
    events: &SharedEventSink,
    queue: &mut [PayoutRequest],
    limits: &BatchLimits,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut cursor = 0;
    while cursor < queue.len() {
        let batch = PayoutBatch::take_next(
            &queue[cursor..],
            cursor,
            limits.max_batch_value,
            limits.max_outputs_per_batch,
        );
        cursor = batch.members().end;
        summary.n_batches += 1;

        match send_batch(ledger, &batch).await {
            Ok(tx_id) => {
                // Output indexes follow dequeue order and ignore merged
                // addresses; see `PayoutBatch::has_merged_outputs`.
                for (request, vout) in queue[batch.members()].iter_mut().zip(1u32..) {
                    request.record(PayoutOutcome::Sent {
                        tx_id: tx_id.clone(),
                        vout,
                    });
                }
                events.emit(PayoutEvent::Success {
                    outputs: batch.into_outputs(),
                    tx_id,
                });
            }
            Err(error) => {
                summary.n_failed_batches += 1;
                for request in queue[batch.members()].iter_mut() {
                    request.record(PayoutOutcome::Failed {
                        error: error.clone(),
                    });
                }
                events.emit(PayoutEvent::Failure {
                    outputs: batch.into_outputs(),
                    error,
                });
            }
        }
    }
    summary
}

#[instrument(
    name = "payouts.send_batch",
    skip_all,
    fields(
        n_members = batch.n_members(),
        n_outputs = batch.outputs().len(),
        batch_value = %batch.value(),
        tx_id
    ),
    err
)]
async fn send_batch(ledger: &SharedLedger, batch: &PayoutBatch) -> Result<TxId, RpcError> {
    if batch.has_merged_outputs() {
        tracing::warn!(
            "batch pays the same address more than once; per-payout vout values will not match the merged outputs"
        );
    }
    let result = ledger.call("sendmany", batch.send_many_args()).await?;
    let tx_id = result
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RpcError::partial_result(format!("unexpected sendmany result: {result}")))?;
    tracing::Span::current().record("tx_id", tracing::field::display(&tx_id));
    Ok(tx_id)
}
