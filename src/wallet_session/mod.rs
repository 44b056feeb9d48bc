mod error;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::instrument;

use std::{future::Future, time::Duration};

use crate::{
    events::{PayoutEvent, SharedEventSink},
    rpc::{RpcError, SharedLedger},
};

pub use error::*;

// bitcoind clamps walletpassphrase timeouts to this.
const MAX_UNLOCK_SECS: u64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked { until: DateTime<Utc> },
}

/// Handle on the node wallet's unlock state.
///
/// The node forgets the passphrase on its own once the unlock duration has
/// elapsed; that expiry is only approximated locally by [`Self::is_unlocked`].
pub struct WalletSession {
    ledger: SharedLedger,
    events: SharedEventSink,
    state: SessionState,
}

impl WalletSession {
    pub fn new(ledger: SharedLedger, events: SharedEventSink) -> Self {
        Self {
            ledger,
            events,
            state: SessionState::Locked,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        match self.state {
            SessionState::Unlocked { until } => Utc::now() < until,
            SessionState::Locked => false,
        }
    }

    #[instrument(name = "wallet_session.unlock", skip(self, passphrase), err)]
    pub async fn unlock(&mut self, passphrase: &str, duration: Duration) -> Result<(), RpcError> {
        self.events.emit(PayoutEvent::Unlocked { duration });
        self.ledger
            .call(
                "walletpassphrase",
                vec![json!(passphrase), json!(duration.as_secs())],
            )
            .await?;
        let secs = duration.as_secs().min(MAX_UNLOCK_SECS) as i64;
        let until = Utc::now() + chrono::Duration::seconds(secs);
        self.state = SessionState::Unlocked { until };
        Ok(())
    }

    #[instrument(name = "wallet_session.lock", skip(self), err)]
    pub async fn lock(&mut self) -> Result<(), RpcError> {
        self.events.emit(PayoutEvent::Locked);
        let res = self.ledger.call("walletlock", vec![]).await;
        self.state = SessionState::Locked;
        res.map(|_| ())
    }

    /// Unlock, run `body`, then lock whatever `body` produced.
    ///
    /// A failed unlock skips both `body` and the lock. A failed lock still
    /// hands back the value `body` produced.
    pub async fn run_unlocked<F, Fut, T>(
        &mut self,
        passphrase: &str,
        duration: Duration,
        body: F,
    ) -> Result<T, ScopeError<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.unlock(passphrase, duration)
            .await
            .map_err(ScopeError::Unlock)?;
        let value = body().await;
        match self.lock().await {
            Ok(()) => Ok(value),
            Err(source) => {
                tracing::error!(error = %source, "wallet could not be locked after unlocked scope");
                Err(ScopeError::Lock { source, value })
            }
        }
    }
}
