use serde_json::Value;

use super::error::RpcError;

/// The structured `{code, message}` object a node returns for a rejected call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteErrorObject {
    pub code: i64,
    pub message: String,
}

/// What a transport hands back before any interpretation.
#[derive(Debug, Clone)]
pub enum RawOutcome {
    Response {
        result: Option<Value>,
        error: Option<RemoteErrorObject>,
    },
    Unreachable(String),
}

impl RawOutcome {
    pub fn result(value: Value) -> Self {
        Self::Response {
            result: Some(value),
            error: None,
        }
    }

    pub fn error(code: i64, message: impl Into<String>) -> Self {
        Self::Response {
            result: None,
            error: Some(RemoteErrorObject {
                code,
                message: message.into(),
            }),
        }
    }
}

pub fn classify(outcome: RawOutcome) -> Result<Value, RpcError> {
    match outcome {
        RawOutcome::Unreachable(message) => Err(RpcError::transport(message)),
        RawOutcome::Response {
            error: Some(RemoteErrorObject { code, message }),
            ..
        } => Err(RpcError::conclusive(code, message)),
        RawOutcome::Response { result, error: None } => {
            let result = result.unwrap_or(Value::Null);
            if let Some(message) = first_embedded_error(&result) {
                return Err(RpcError::partial_result(message));
            }
            Ok(result)
        }
    }
}

// Some calls (estimatesmartfee, walletprocesspsbt, ..) answer "successfully"
// with an `errors` list instead of a result.
fn first_embedded_error(result: &Value) -> Option<String> {
    let first = result.get("errors")?.as_array()?.first()?;
    Some(match first {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

impl From<bitcoincore_rpc::Error> for RawOutcome {
    fn from(err: bitcoincore_rpc::Error) -> Self {
        use bitcoincore_rpc::jsonrpc;
        match err {
            bitcoincore_rpc::Error::JsonRpc(jsonrpc::error::Error::Rpc(e)) => {
                RawOutcome::error(i64::from(e.code), e.message)
            }
            other => RawOutcome::Unreachable(other.to_string()),
        }
    }
}
