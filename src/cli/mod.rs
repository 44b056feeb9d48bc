mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast;

use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::{
    credentials::{PromptPassphrase, SharedPassphraseSource},
    events::{BroadcastEventSink, PayoutEvent},
    fees::FeeEstimator,
    node::NodeClient,
    payout::{plan_batches, BatchLimits, PayoutBatcher, PayoutRequest},
    primitives::*,
    rpc::{BitcoindLedger, SharedLedger},
    transaction::TransactionEnricher,
};
pub use config::*;

#[derive(Parser)]
#[clap(version, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[clap(short, long, env = "PAYOUT_BATCHER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,
    #[clap(long, env = "BITCOIND_ENDPOINT")]
    bitcoind_endpoint: Option<String>,
    #[clap(long, env = "BITCOIND_RPC_USER")]
    rpc_user: Option<String>,
    #[clap(long, env = "BITCOIND_RPC_PASSWORD", hide_env_values = true)]
    rpc_password: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pays every payout in FILE, batching them into sendmany calls
    Pay {
        /// YAML or JSON list of `{address, satoshis}`
        #[clap(value_name = "FILE")]
        payouts: PathBuf,
        #[clap(long)]
        max_batch_value: Option<u64>,
        #[clap(long)]
        max_outputs_per_batch: Option<usize>,
        #[clap(long)]
        unlock_seconds: Option<u64>,
        /// Print the batches that would be sent and exit
        #[clap(long)]
        dry_run: bool,
        #[clap(env = "WALLET_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,
    },
    /// Shows a transaction with its fee and input provenance
    Tx {
        txid: String,
        /// Skip resolving inputs
        #[clap(long)]
        raw: bool,
    },
    Confirmations {
        txid: String,
    },
    EstimateFee {
        #[clap(short, long, value_enum, default_value = "next-block")]
        priority: TxPriority,
    },
    Tip,
    Balance,
    ValidateAddress {
        address: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_path(
        cli.config,
        EnvOverride {
            bitcoind_endpoint: cli.bitcoind_endpoint,
            rpc_user: cli.rpc_user,
            rpc_password: cli.rpc_password,
        },
    )?;
    crate::tracing::init_tracer(config.tracing.clone())?;

    let ledger: SharedLedger = Arc::new(
        BitcoindLedger::connect(&config.bitcoind).context("Couldn't connect to bitcoind")?,
    );
    let passphrases: SharedPassphraseSource = Arc::new(PromptPassphrase::default());
    let events = BroadcastEventSink::new();

    match cli.command {
        Command::Pay {
            payouts,
            max_batch_value,
            max_outputs_per_batch,
            unlock_seconds,
            dry_run,
            passphrase,
        } => {
            let limits = override_limits(
                config.payouts,
                max_batch_value,
                max_outputs_per_batch,
                unlock_seconds,
            );
            let requests = read_payouts(&payouts)?;
            if dry_run {
                let plan: Vec<_> = plan_batches(
                    &requests,
                    limits.max_batch_value,
                    limits.max_outputs_per_batch,
                )
                .into_iter()
                .map(|batch| batch.into_outputs())
                .collect();
                return print_json(&plan);
            }
            let log_events = tokio::spawn(log_events(events.subscribe()));
            let batcher = PayoutBatcher::new(ledger, Arc::new(events), passphrases);
            let res = batcher.pay_many(requests, passphrase, limits).await;
            drop(batcher);
            let _ = log_events.await;
            match res {
                Ok(payouts) => print_json(&payouts)?,
                Err(e) => {
                    let message = e.to_string();
                    print_json(&e.into_payouts())?;
                    anyhow::bail!(message);
                }
            }
        }
        Command::Tx { txid, raw } => {
            let enricher = TransactionEnricher::new(ledger);
            if raw {
                print_json(&enricher.get_raw_transaction(&txid).await?)?;
            } else {
                print_json(&enricher.get_enriched(&txid).await?)?;
            }
        }
        Command::Confirmations { txid } => {
            let enricher = TransactionEnricher::new(ledger);
            print_json(&enricher.get_confirmations(&txid).await?)?;
        }
        Command::EstimateFee { priority } => {
            let fees = FeeEstimator::new(ledger);
            let fee_rate = fees.fee_rate(priority).await?;
            print_json(&serde_json::json!({
                "sats_per_vbyte": fee_rate.as_sat_per_vb(),
                "sats_per_kvbyte": fee_rate.sats_per_kvb(),
            }))?;
        }
        Command::Tip => {
            let node = NodeClient::new(ledger, Arc::new(events), passphrases);
            print_json(&node.get_tip().await?)?;
        }
        Command::Balance => {
            let node = NodeClient::new(ledger, Arc::new(events), passphrases);
            print_json(&node.get_balance().await?)?;
        }
        Command::ValidateAddress { address } => {
            let node = NodeClient::new(ledger, Arc::new(events), passphrases);
            print_json(&node.validate_address(&address).await?)?;
        }
    }
    Ok(())
}

fn override_limits(
    mut limits: BatchLimits,
    max_batch_value: Option<u64>,
    max_outputs_per_batch: Option<usize>,
    unlock_seconds: Option<u64>,
) -> BatchLimits {
    if let Some(value) = max_batch_value {
        limits.max_batch_value = Satoshis::from(value);
    }
    if let Some(n) = max_outputs_per_batch {
        limits.max_outputs_per_batch = n;
    }
    if let Some(secs) = unlock_seconds {
        limits.unlock_duration = Duration::from_secs(secs);
    }
    limits
}

fn read_payouts(path: &PathBuf) -> anyhow::Result<Vec<PayoutRequest>> {
    let file = std::fs::read_to_string(path).context("Couldn't read payouts file")?;
    // YAML is a superset of JSON
    let payouts: Vec<PayoutRequest> =
        serde_yaml::from_str(&file).context("Couldn't parse payouts file")?;
    if let Some(invalid) = payouts.iter().find(|p| !p.has_valid_amount()) {
        anyhow::bail!(
            "Invalid amount {} for {}: must be a whole number of satoshis >= 0",
            invalid.satoshis,
            invalid.address
        );
    }
    Ok(payouts)
}

/// Logs events until `Done` or until every sender is gone. Returns how many
/// events were logged.
async fn log_events(mut receiver: broadcast::Receiver<PayoutEvent>) -> usize {
    let mut n_logged = 0;
    loop {
        match receiver.recv().await {
            Ok(event) => {
                n_logged += 1;
                let done = event == PayoutEvent::Done;
                tracing::info!(event = %serde_json::to_string(&event).unwrap_or_default(), "payout event");
                if done {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n_skipped)) => {
                tracing::warn!(n_skipped, "payout event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    n_logged
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
