mod helpers;

use rust_decimal_macros::dec;
use serde_json::json;

use helpers::*;
use payout_batcher::{
    fees::{error::FeeEstimationError, FeeEstimator},
    primitives::{Satoshis, TxPriority},
    rpc::{RawOutcome, RpcError},
};

#[tokio::test]
async fn estimate_is_converted_to_sats() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    ledger.respond(
        "estimatesmartfee",
        RawOutcome::result(json!({ "feerate": 0.00012345, "blocks": 2 })),
    );
    let fees = FeeEstimator::new(ledger.clone());

    let fee_rate = fees.estimate_fee_rate(2).await?;

    assert_eq!(fee_rate.sats_per_kvb(), Satoshis::from(12_345u64));
    assert_eq!(fee_rate.as_sat_per_vb(), dec!(12.345));
    assert_eq!(ledger.calls_to("estimatesmartfee"), vec![vec![json!(2)]]);
    Ok(())
}

#[tokio::test]
async fn priority_maps_to_confirmation_target() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    for _ in 0..3 {
        ledger.respond(
            "estimatesmartfee",
            RawOutcome::result(json!({ "feerate": 0.00001, "blocks": 1 })),
        );
    }
    let fees = FeeEstimator::new(ledger.clone());

    fees.fee_rate(TxPriority::NextBlock).await?;
    fees.fee_rate(TxPriority::HalfHour).await?;
    fees.fee_rate(TxPriority::OneHour).await?;

    assert_eq!(
        ledger.calls_to("estimatesmartfee"),
        vec![vec![json!(1)], vec![json!(3)], vec![json!(6)]]
    );
    Ok(())
}

#[tokio::test]
async fn embedded_errors_become_partial_results() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    ledger.respond(
        "estimatesmartfee",
        RawOutcome::result(json!({ "errors": ["Insufficient data or no feerate found"], "blocks": 0 })),
    );
    let fees = FeeEstimator::new(ledger.clone());

    let err = fees.estimate_fee_rate(2).await.expect_err("no estimate");
    match err {
        FeeEstimationError::Rpc(e) => assert_eq!(
            e,
            RpcError::partial_result("Insufficient data or no feerate found")
        ),
        other => panic!("expected rpc error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_feerate_is_reported() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::new();
    ledger.respond("estimatesmartfee", RawOutcome::result(json!({ "blocks": 6 })));
    let fees = FeeEstimator::new(ledger.clone());

    let err = fees.fee_rate(TxPriority::OneHour).await.expect_err("no estimate");
    assert!(matches!(err, FeeEstimationError::NoFeeRate(6)));
    Ok(())
}
