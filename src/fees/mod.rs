pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::{primitives::*, rpc::SharedLedger};
use error::FeeEstimationError;

const BYTES_PER_KB: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    sats_per_kvb: Satoshis,
}

impl FeeRate {
    /// `btc_per_kvb` as quoted by the node, rounded to whole satoshis.
    pub fn from_btc_per_kvb(btc_per_kvb: Decimal) -> Self {
        Self {
            sats_per_kvb: Satoshis::from_btc(btc_per_kvb).round(),
        }
    }

    pub fn sats_per_kvb(&self) -> Satoshis {
        self.sats_per_kvb
    }

    pub fn as_sat_per_vb(&self) -> Decimal {
        self.sats_per_kvb.into_inner() / Decimal::from(BYTES_PER_KB)
    }

    pub fn to_btc_per_kvb(&self) -> Decimal {
        self.sats_per_kvb.to_btc()
    }
}

#[derive(Debug, Deserialize)]
struct SmartFeeResponse {
    feerate: Option<Decimal>,
}

#[derive(Clone)]
pub struct FeeEstimator {
    ledger: SharedLedger,
}

impl FeeEstimator {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    #[instrument(name = "fees.estimate_fee_rate", skip(self), fields(fee_rate), err)]
    pub async fn estimate_fee_rate(&self, n_blocks: u16) -> Result<FeeRate, FeeEstimationError> {
        let value = self
            .ledger
            .call("estimatesmartfee", vec![json!(n_blocks)])
            .await?;
        let response: SmartFeeResponse = serde_json::from_value(value)?;
        let fee_rate = FeeRate::from_btc_per_kvb(
            response
                .feerate
                .ok_or(FeeEstimationError::NoFeeRate(n_blocks))?,
        );
        tracing::Span::current().record(
            "fee_rate",
            tracing::field::display(fee_rate.as_sat_per_vb()),
        );
        Ok(fee_rate)
    }

    pub async fn fee_rate(&self, priority: TxPriority) -> Result<FeeRate, FeeEstimationError> {
        self.estimate_fee_rate(priority.n_blocks()).await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn converts_to_sats_per_byte() {
        let rate = FeeRate::from_btc_per_kvb(dec!(0.00012345));
        assert_eq!(rate.sats_per_kvb(), Satoshis::from(12_345u64));
        assert_eq!(rate.as_sat_per_vb(), dec!(12.345));
    }

    #[test]
    fn rounds_sub_satoshi_quotes() {
        let rate = FeeRate::from_btc_per_kvb(dec!(0.000010005));
        assert_eq!(rate.sats_per_kvb(), Satoshis::from(1001u64));
    }

    #[test]
    fn inverse_conversion_recovers_quote() {
        for quote in [dec!(0.00001), dec!(0.00020634), dec!(0.0012), dec!(0.000011119)] {
            let rate = FeeRate::from_btc_per_kvb(quote);
            let recovered = rate.as_sat_per_vb() * Decimal::from(BYTES_PER_KB) / SATS_PER_BTC;
            assert!((recovered - quote).abs() <= dec!(0.000000005));
            assert_eq!(recovered, rate.to_btc_per_kvb());
        }
    }
}
