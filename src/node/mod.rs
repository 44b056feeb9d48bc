pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

use std::time::Duration;

use crate::{
    credentials::SharedPassphraseSource,
    events::SharedEventSink,
    primitives::*,
    rpc::SharedLedger,
    wallet_session::{ScopeError, WalletSession},
};
use error::NodeError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: String,
}

#[derive(Deserialize)]
struct BlockchainInfo {
    blocks: u64,
    bestblockhash: String,
}

#[derive(Deserialize)]
struct WalletInfo {
    balance: Decimal,
}

#[derive(Deserialize)]
struct ValidateAddressResponse {
    isvalid: bool,
}

/// Single-call passthroughs to the node that need no batching.
#[derive(Clone)]
pub struct NodeClient {
    ledger: SharedLedger,
    events: SharedEventSink,
    passphrases: SharedPassphraseSource,
}

impl NodeClient {
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

    #[instrument(name = "node.send_to_address", skip(self), err)]
    pub async fn send_to_address(
        &self,
        address: &str,
        satoshis: Satoshis,
    ) -> Result<TxId, NodeError> {
        let value = self
            .ledger
            .call("sendtoaddress", vec![json!(address), satoshis.to_btc_json()])
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Pay a single address inside its own unlock of the wallet.
    pub async fn unlock_and_send_to_address(
        &self,
        address: &str,
        satoshis: Satoshis,
        passphrase: Option<String>,
        duration: Duration,
    ) -> Result<TxId, NodeError> {
        let passphrase = match passphrase {
            Some(passphrase) => passphrase,
            None => self.passphrases.passphrase().await?,
        };
        let mut session = WalletSession::new(self.ledger.clone(), self.events.clone());
        match session
            .run_unlocked(&passphrase, duration, || self.send_to_address(address, satoshis))
            .await
        {
            Ok(res) => res,
            Err(ScopeError::Unlock(e)) => Err(e.into()),
            Err(ScopeError::Lock { source, value }) => Err(NodeError::WalletLockFailed {
                source,
                tx_id: value.ok(),
            }),
        }
    }

    #[instrument(name = "node.get_balance", skip(self), err)]
    pub async fn get_balance(&self) -> Result<Satoshis, NodeError> {
        let value = self.ledger.call("getwalletinfo", vec![]).await?;
        let info: WalletInfo = serde_json::from_value(value)?;
        Ok(Satoshis::from_btc(info.balance))
    }

    pub async fn get_best_block_hash(&self) -> Result<String, NodeError> {
        let value = self.ledger.call("getbestblockhash", vec![]).await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(name = "node.get_tip", skip(self), err)]
    pub async fn get_tip(&self) -> Result<ChainTip, NodeError> {
        let value = self.ledger.call("getblockchaininfo", vec![]).await?;
        let BlockchainInfo {
            blocks,
            bestblockhash,
        } = serde_json::from_value(value)?;
        Ok(ChainTip {
            height: blocks,
            hash: bestblockhash,
        })
    }

    pub async fn validate_address(&self, address: &str) -> Result<bool, NodeError> {
        let value = self
            .ledger
            .call("validateaddress", vec![json!(address)])
            .await?;
        let response: ValidateAddressResponse = serde_json::from_value(value)?;
        Ok(response.isvalid)
    }

    pub async fn send_raw_transaction(&self, raw_tx: &str) -> Result<TxId, NodeError> {
        let value = self
            .ledger
            .call("sendrawtransaction", vec![json!(raw_tx)])
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn decode_raw_transaction(&self, raw_tx: &str) -> Result<Value, NodeError> {
        Ok(self
            .ledger
            .call("decoderawtransaction", vec![json!(raw_tx)])
            .await?)
    }

    pub async fn get_block(&self, hash: &str) -> Result<Value, NodeError> {
        Ok(self.ledger.call("getblock", vec![json!(hash)]).await?)
    }
}
