use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{payout::BatchLimits, rpc::BitcoindConfig, tracing::TracingConfig};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bitcoind: BitcoindConfig,
    #[serde(default)]
    pub payouts: BatchLimits,
    #[serde(default)]
    pub tracing: TracingConfig,
}

#[derive(Debug, Default)]
pub struct EnvOverride {
    pub bitcoind_endpoint: Option<String>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
}

impl Config {
    pub fn from_path(path: Option<impl AsRef<Path>>, env: EnvOverride) -> anyhow::Result<Self> {
        let mut config: Config = match path {
            Some(path) => {
                let config_file =
                    std::fs::read_to_string(path).context("Couldn't read config file")?;
                serde_yaml::from_str(&config_file).context("Couldn't parse config file")?
            }
            None => Config::default(),
        };
        config.apply(env);
        Ok(config)
    }

    fn apply(
        &mut self,
        EnvOverride {
            bitcoind_endpoint,
            rpc_user,
            rpc_password,
        }: EnvOverride,
    ) {
        if let Some(endpoint) = bitcoind_endpoint {
            self.bitcoind.endpoint = endpoint;
        }
        if let Some(user) = rpc_user {
            self.bitcoind.rpc_user = user;
        }
        if let Some(password) = rpc_password {
            self.bitcoind.rpc_password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use super::*;
    use crate::primitives::Satoshis;

    #[test]
    fn loads_yaml_with_env_override() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
bitcoind:
  endpoint: http://bitcoind:18443
  rpc_user: fromfile
  wallet: payouts
payouts:
  max_batch_value: 300000000
  max_outputs_per_batch: 25
  unlock_duration: 600
"#
        )?;
        let config = Config::from_path(
            Some(file.path()),
            EnvOverride {
                rpc_password: Some("secret".to_string()),
                ..Default::default()
            },
        )?;
        assert_eq!(config.bitcoind.url(), "http://bitcoind:18443/wallet/payouts");
        assert_eq!(config.bitcoind.rpc_user, "fromfile");
        assert_eq!(config.bitcoind.rpc_password, "secret");
        assert_eq!(config.payouts.max_batch_value, Satoshis::from(300_000_000u64));
        assert_eq!(config.payouts.max_outputs_per_batch, 25);
        assert_eq!(config.payouts.unlock_duration, Duration::from_secs(600));
        assert_eq!(config.tracing.filter, "info");
        Ok(())
    }

    #[test]
    fn no_file_means_defaults() -> anyhow::Result<()> {
        let config = Config::from_path(
            None::<&Path>,
            EnvOverride {
                bitcoind_endpoint: Some("http://localhost:8332".to_string()),
                ..Default::default()
            },
        )?;
        assert_eq!(config.bitcoind.endpoint, "http://localhost:8332");
        assert_eq!(config.payouts, BatchLimits::default());
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::from_path(Some("/nonexistent/payout-batcher.yml"), Default::default()).is_err());
    }
}
