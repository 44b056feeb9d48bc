mod bitcoind;
pub mod classify;
pub mod error;

use async_trait::async_trait;
use serde_json::Value;

use std::sync::Arc;

pub use bitcoind::*;
pub use classify::{classify, RawOutcome, RemoteErrorObject};
pub use error::RpcError;

/// bitcoind error codes the rest of the crate reacts to.
pub mod codes {
    pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;
    pub const RPC_WALLET_INSUFFICIENT_FUNDS: i64 = -6;
    pub const RPC_WALLET_UNLOCK_NEEDED: i64 = -13;
    pub const RPC_WALLET_PASSPHRASE_INCORRECT: i64 = -14;
}

/// Invoke a named remote procedure with positional arguments.
///
/// Implementations must run every raw outcome through [`classify`] so that
/// callers only ever see the three [`RpcError`] shapes.
#[async_trait]
pub trait RemoteLedger: Send + Sync + 'static {
    async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError>;
}

pub type SharedLedger = Arc<dyn RemoteLedger>;
