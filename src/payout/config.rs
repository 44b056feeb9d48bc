use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::primitives::Satoshis;

#[serde_with::serde_as]
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq, Eq)]
#[builder(default)]
pub struct BatchLimits {
    /// A batch stops growing once its value reaches this.
    #[serde(default = "default_max_batch_value")]
    #[builder(setter(into))]
    pub max_batch_value: Satoshis,
    #[serde(default = "default_max_outputs_per_batch")]
    pub max_outputs_per_batch: usize,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_unlock_duration")]
    pub unlock_duration: Duration,
}

impl BatchLimits {
    pub fn builder() -> BatchLimitsBuilder {
        BatchLimitsBuilder::default()
    }
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_batch_value: default_max_batch_value(),
            max_outputs_per_batch: default_max_outputs_per_batch(),
            unlock_duration: default_unlock_duration(),
        }
    }
}

fn default_max_batch_value() -> Satoshis {
    Satoshis::from(1_000_000_000u64)
}

fn default_max_outputs_per_batch() -> usize {
    1
}

fn default_unlock_duration() -> Duration {
    Duration::from_secs(10800)
}
