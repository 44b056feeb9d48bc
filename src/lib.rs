#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

mod macros;

pub mod cli;
pub mod credentials;
pub mod events;
pub mod fees;
pub mod node;
pub mod payout;
pub mod primitives;
pub mod rpc;
mod tracing;
pub mod transaction;
pub mod wallet_session;
