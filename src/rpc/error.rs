use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a remote call that did not produce a usable value.
///
/// `Transport` means the call itself never completed and the node may or may
/// not have acted on it. The other two variants are answers from the node.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RpcError {
    #[error("RpcError - Transport: {message}")]
    Transport { message: String },
    #[error("RpcError - Conclusive ({code}): {message}")]
    Conclusive { code: i64, message: String },
    #[error("RpcError - PartialResult: {message}")]
    PartialResult { message: String },
}

impl RpcError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn conclusive(code: i64, message: impl Into<String>) -> Self {
        Self::Conclusive {
            code,
            message: message.into(),
        }
    }

    pub fn partial_result(message: impl Into<String>) -> Self {
        Self::PartialResult {
            message: message.into(),
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Conclusive { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message }
            | Self::Conclusive { message, .. }
            | Self::PartialResult { message } => message,
        }
    }

    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Self::Transport { .. })
    }

    pub fn has_code(&self, code: i64) -> bool {
        self.code() == Some(code)
    }
}
