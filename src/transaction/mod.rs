mod entity;
pub mod error;

use serde_json::json;
use tracing::instrument;

use std::collections::HashMap;

use crate::rpc::{codes, SharedLedger};

pub use entity::*;
use error::TransactionError;

/// Read path that reconstructs fee and confirmation data for a transaction.
#[derive(Clone)]
pub struct TransactionEnricher {
    ledger: SharedLedger,
}

impl TransactionEnricher {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    /// `None` when the node does not know the transaction.
    #[instrument(name = "transaction.get_raw_transaction", skip(self), err)]
    pub async fn get_raw_transaction(
        &self,
        txid: &str,
    ) -> Result<Option<RawTransaction>, TransactionError> {
        match self
            .ledger
            .call("getrawtransaction", vec![json!(txid), json!(true)])
            .await
        {
            Ok(value) => Ok(Some(RawTransaction::from_node_json(value)?)),
            Err(e) if e.has_code(codes::RPC_INVALID_ADDRESS_OR_KEY) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch `txid` and resolve every input against the output it spends.
    ///
    /// Sources are fetched raw, so resolution never goes deeper than the
    /// inputs of `txid` itself.
    #[instrument(
        name = "transaction.get_enriched",
        skip(self),
        fields(n_inputs, fee, has_unconfirmed_input),
        err
    )]
    pub async fn get_enriched(
        &self,
        txid: &str,
    ) -> Result<Option<EnrichedTransaction>, TransactionError> {
        let tx = match self.get_raw_transaction(txid).await? {
            Some(tx) => tx,
            None => return Ok(None),
        };
        let span = tracing::Span::current();
        span.record("n_inputs", tx.vin.len());

        let mut source_txs: HashMap<String, RawTransaction> = HashMap::new();
        let mut sources = Vec::with_capacity(tx.vin.len());
        for input in tx.vin.iter() {
            let (source_txid, vout) = match input.spends() {
                Some(spends) => spends,
                None => {
                    sources.push(None);
                    continue;
                }
            };
            if !source_txs.contains_key(source_txid) {
                let source_tx = self.get_raw_transaction(source_txid).await?.ok_or_else(|| {
                    TransactionError::SourceTransactionNotFound(source_txid.to_string())
                })?;
                source_txs.insert(source_txid.to_string(), source_tx);
            }
            let source_tx = &source_txs[source_txid];
            let output =
                source_tx
                    .output(vout)
                    .ok_or_else(|| TransactionError::SourceOutputNotFound {
                        txid: source_txid.to_string(),
                        vout,
                    })?;
            sources.push(Some(ResolvedInput {
                value: output.value,
                address: output.address.clone(),
                confirmations: source_tx.confirmations,
            }));
        }

        let enriched = EnrichedTransaction::new(tx, sources);
        span.record("fee", tracing::field::display(enriched.fee));
        span.record("has_unconfirmed_input", enriched.has_unconfirmed_input);
        Ok(Some(enriched))
    }

    /// `None` when unknown, 0 while the transaction is not in a block.
    #[instrument(name = "transaction.get_confirmations", skip(self), err)]
    pub async fn get_confirmations(&self, txid: &str) -> Result<Option<u32>, TransactionError> {
        Ok(self.get_raw_transaction(txid).await?.map(|tx| {
            if tx.blockhash.is_none() {
                0
            } else {
                tx.confirmations
            }
        }))
    }
}
