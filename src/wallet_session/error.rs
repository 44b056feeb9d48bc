use thiserror::Error;

use crate::rpc::RpcError;

#[derive(Error, Debug)]
pub enum ScopeError<T> {
    #[error("ScopeError - Unlock: {0}")]
    Unlock(#[source] RpcError),
    #[error("ScopeError - Lock: {source}")]
    Lock { source: RpcError, value: T },
}

impl<T> ScopeError<T> {
    pub fn rpc_error(&self) -> &RpcError {
        match self {
            Self::Unlock(e) => e,
            Self::Lock { source, .. } => source,
        }
    }
}
