use serde::Serialize;
use serde_json::{Map, Value};

use crate::API_VERSION;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope {
    pub ok: bool,
    pub command: String,
    pub version: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureEnvelope {
    pub ok: bool,
    pub error: ErrorContract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorContract {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
}

pub fn success<T>(command: &str, data: T) -> ClientResult<SuccessEnvelope>
where
    T: Serialize,
{
    let json_data = serde_json::to_value(data)
        .map_err(|err| ClientError::internal_serialization(&err.to_string()))?;
    Ok(SuccessEnvelope {
        ok: true,
        command: command.to_string(),
        version: API_VERSION.to_string(),
        data: json_data,
    })
}

/// Body returned by the HTTP API when a request is refused.
///
/// Unlike [`FailureEnvelope`] it is flat: `error` carries the message and the
/// error's data fields (`sheets_found`, `details`, ...) sit beside it. CLI-only
/// `help_*` fields are dropped.
#[derive(Debug, Clone, Serialize)]
pub struct HttpErrorBody {
    pub error: String,
    pub code: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl From<&ClientError> for ErrorContract {
    fn from(error: &ClientError) -> Self {
        Self {
            code: error.code.clone(),
            message: error.message.clone(),
            recovery_steps: error.recovery_steps.clone(),
        }
    }
}

impl From<&ClientError> for HttpErrorBody {
    fn from(error: &ClientError) -> Self {
        let fields = match error.data.as_ref() {
            Some(Value::Object(data)) => data
                .iter()
                .filter(|(key, _)| {
                    !key.starts_with("help_") && key.as_str() != "error" && key.as_str() != "code"
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            _ => Map::new(),
        };
        Self {
            error: error.message.clone(),
            code: error.code.clone(),
            fields,
        }
    }
}

pub fn failure_from_error(error: &ClientError) -> FailureEnvelope {
    FailureEnvelope {
        ok: false,
        error: ErrorContract::from(error),
        data: error.data.clone(),
    }
}
