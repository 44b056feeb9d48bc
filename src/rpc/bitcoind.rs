use async_trait::async_trait;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use std::{path::PathBuf, sync::Arc};

use super::{classify::*, error::RpcError, RemoteLedger};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BitcoindConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub rpc_user: String,
    #[serde(default)]
    pub rpc_password: String,
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
    #[serde(default)]
    pub wallet: Option<String>,
}

impl BitcoindConfig {
    pub fn url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        match &self.wallet {
            Some(wallet) => format!("{endpoint}/wallet/{wallet}"),
            None => endpoint.to_string(),
        }
    }

    fn auth(&self) -> Auth {
        match &self.cookie_file {
            Some(path) => Auth::CookieFile(path.clone()),
            None if self.rpc_user.is_empty() => Auth::None,
            None => Auth::UserPass(self.rpc_user.clone(), self.rpc_password.clone()),
        }
    }
}

impl Default for BitcoindConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            rpc_user: String::new(),
            rpc_password: String::new(),
            cookie_file: None,
            wallet: None,
        }
    }
}

fn default_endpoint() -> String {
    "http://127.0.0.1:18443".to_string()
}

/// [`RemoteLedger`] backed by a bitcoind JSON-RPC endpoint.
#[derive(Clone)]
pub struct BitcoindLedger {
    inner: Arc<Client>,
}

impl BitcoindLedger {
    pub fn connect(cfg: &BitcoindConfig) -> Result<Self, RpcError> {
        let client = Client::new(&cfg.url(), cfg.auth()).map_err(|e| {
            RpcError::transport(format!("Failed to connect to bitcoind: {e}"))
        })?;
        Ok(Self {
            inner: Arc::new(client),
        })
    }
}

#[async_trait]
impl RemoteLedger for BitcoindLedger {
    #[instrument(name = "bitcoind.call", skip(self, args), err)]
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError> {
        let client = Arc::clone(&self.inner);
        let cmd = method.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            match client.call::<Value>(&cmd, &args) {
                Ok(value) => RawOutcome::result(value),
                Err(e) => RawOutcome::from(e),
            }
        })
        .await
        .unwrap_or_else(|e| RawOutcome::Unreachable(format!("bitcoind call aborted: {e}")));
        classify(outcome)
    }
}
