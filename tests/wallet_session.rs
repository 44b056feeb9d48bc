mod helpers;

use serde_json::json;

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use helpers::*;
use payout_batcher::{
    rpc::{codes, RawOutcome},
    wallet_session::{ScopeError, SessionState, WalletSession},
};

#[tokio::test]
async fn unlock_then_lock() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    let sink = RecordingSink::new();
    let mut session = WalletSession::new(ledger.clone(), sink.clone());
    assert_eq!(session.state(), SessionState::Locked);

    session.unlock("pass", Duration::from_secs(60)).await?;
    assert!(session.is_unlocked());
    assert_eq!(
        ledger.calls_to("walletpassphrase"),
        vec![vec![json!("pass"), json!(60)]]
    );

    session.lock().await?;
    assert_eq!(session.state(), SessionState::Locked);
    assert!(!session.is_unlocked());
    assert_eq!(sink.kinds(), vec!["unlocked", "locked"]);
    Ok(())
}

#[tokio::test]
async fn failed_unlock_leaves_session_locked() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    let sink = RecordingSink::new();
    ledger.respond(
        "walletpassphrase",
        RawOutcome::error(codes::RPC_WALLET_PASSPHRASE_INCORRECT, "incorrect"),
    );
    let mut session = WalletSession::new(ledger.clone(), sink.clone());

    let err = session
        .unlock("wrong", Duration::from_secs(60))
        .await
        .expect_err("unlock rejected");
    assert!(err.has_code(codes::RPC_WALLET_PASSPHRASE_INCORRECT));
    assert_eq!(session.state(), SessionState::Locked);
    Ok(())
}

#[tokio::test]
async fn scoped_body_is_skipped_when_unlock_fails() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    let sink = RecordingSink::new();
    ledger.respond("walletpassphrase", RawOutcome::Unreachable("down".to_string()));
    let mut session = WalletSession::new(ledger.clone(), sink.clone());

    let ran = AtomicBool::new(false);
    let ran_ref = &ran;
    let res = session
        .run_unlocked("pass", Duration::from_secs(60), || async move {
            ran_ref.store(true, Ordering::SeqCst);
        })
        .await;

    assert!(matches!(res, Err(ScopeError::Unlock(_))));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(ledger.methods(), vec!["walletpassphrase"]);
    Ok(())
}

#[tokio::test]
async fn scoped_body_failure_still_locks() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    let sink = RecordingSink::new();
    let mut session = WalletSession::new(ledger.clone(), sink.clone());

    let res = session
        .run_unlocked("pass", Duration::from_secs(60), || async {
            Err::<(), _>("body failed")
        })
        .await;

    assert!(matches!(res, Ok(Err("body failed"))));
    assert_eq!(ledger.methods(), vec!["walletpassphrase", "walletlock"]);
    assert_eq!(session.state(), SessionState::Locked);
    Ok(())
}

#[tokio::test]
async fn lock_failure_hands_back_the_body_value() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    let sink = RecordingSink::new();
    ledger.respond("walletlock", RawOutcome::Unreachable("reset".to_string()));
    let mut session = WalletSession::new(ledger.clone(), sink.clone());

    let res = session
        .run_unlocked("pass", Duration::from_secs(60), || async { 42 })
        .await;

    match res {
        Err(ScopeError::Lock { source, value }) => {
            assert_eq!(value, 42);
            assert!(!source.is_conclusive());
        }
        other => panic!("expected lock failure, got {other:?}"),
    }
    assert_eq!(session.state(), SessionState::Locked);
    Ok(())
}
