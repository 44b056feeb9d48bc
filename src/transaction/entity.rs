use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::primitives::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<TxId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
}

impl TxInput {
    /// The output this input spends. `None` for coinbase inputs.
    pub fn spends(&self) -> Option<(&str, u32)> {
        match (&self.txid, self.vout) {
            (Some(txid), Some(vout)) if self.coinbase.is_none() => Some((txid, vout)),
            _ => None,
        }
    }
}

/// An output with its value in satoshis. Decoded from the node's
/// BTC-denominated `vout` entries, never read back from this shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxOutput {
    pub value: Satoshis,
    pub n: u32,
    pub address: Option<String>,
}

#[derive(Deserialize)]
struct NodeTxOutput {
    value: Decimal,
    n: u32,
    #[serde(rename = "scriptPubKey", default)]
    script_pub_key: NodeScriptPubKey,
}

#[derive(Deserialize, Default)]
struct NodeScriptPubKey {
    #[serde(default)]
    address: Option<String>,
    // pre 22.0 nodes
    #[serde(default)]
    addresses: Option<Vec<String>>,
}

impl From<NodeTxOutput> for TxOutput {
    fn from(out: NodeTxOutput) -> Self {
        let NodeScriptPubKey { address, addresses } = out.script_pub_key;
        Self {
            value: Satoshis::from_btc(out.value),
            n: out.n,
            address: address.or_else(|| addresses.and_then(|a| a.into_iter().next())),
        }
    }
}

/// A transaction as reported by `getrawtransaction <txid> true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawTransaction {
    pub txid: TxId,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    pub confirmations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
}

#[derive(Deserialize)]
struct NodeTransaction {
    txid: TxId,
    vin: Vec<TxInput>,
    vout: Vec<NodeTxOutput>,
    #[serde(default)]
    confirmations: u32,
    #[serde(default)]
    blockhash: Option<String>,
}

impl From<NodeTransaction> for RawTransaction {
    fn from(tx: NodeTransaction) -> Self {
        Self {
            txid: tx.txid,
            vin: tx.vin,
            vout: tx.vout.into_iter().map(TxOutput::from).collect(),
            confirmations: tx.confirmations,
            blockhash: tx.blockhash,
        }
    }
}

impl RawTransaction {
    /// Decode the verbose `getrawtransaction` answer.
    pub fn from_node_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value::<NodeTransaction>(value).map(Self::from)
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.iter().any(|input| input.coinbase.is_some())
    }

    pub fn output(&self, vout: u32) -> Option<&TxOutput> {
        self.vout.iter().find(|out| out.n == vout)
    }

    pub fn total_output_value(&self) -> Satoshis {
        self.vout.iter().map(|out| out.value).sum()
    }
}

/// What an input spends, copied from the transaction that created it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedInput {
    pub value: Satoshis,
    pub address: Option<String>,
    pub confirmations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedInput {
    #[serde(flatten)]
    pub input: TxInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResolvedInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTransaction {
    pub txid: TxId,
    pub vin: Vec<EnrichedInput>,
    pub vout: Vec<TxOutput>,
    pub confirmations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<String>,
    pub fee: Satoshis,
    pub has_unconfirmed_input: bool,
}

impl EnrichedTransaction {
    /// `sources` holds one entry per input of `tx`, `None` for coinbase inputs.
    pub fn new(tx: RawTransaction, sources: Vec<Option<ResolvedInput>>) -> Self {
        debug_assert_eq!(tx.vin.len(), sources.len());
        let has_unconfirmed_input = sources
            .iter()
            .flatten()
            .any(|source| source.confirmations < 1);
        let fee = if tx.is_coinbase() {
            Satoshis::ZERO
        } else {
            let total_in: Satoshis = sources.iter().flatten().map(|s| s.value).sum();
            total_in - tx.total_output_value()
        };
        let RawTransaction {
            txid,
            vin,
            vout,
            confirmations,
            blockhash,
        } = tx;
        Self {
            txid,
            vin: vin
                .into_iter()
                .zip(sources)
                .map(|(input, source)| EnrichedInput { input, source })
                .collect(),
            vout,
            confirmations,
            blockhash,
            fee,
            has_unconfirmed_input,
        }
    }
}
