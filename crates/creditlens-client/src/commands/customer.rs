use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::CustomerData;
use crate::import;
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct CustomerShowOptions {
    pub path: Option<String>,
    pub customer_id: String,
    pub stdin_override: Option<Vec<u8>>,
}

pub fn run(path: Option<String>, customer_id: &str) -> ClientResult<SuccessEnvelope> {
    run_with_options(CustomerShowOptions {
        path,
        customer_id: customer_id.to_string(),
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: CustomerShowOptions) -> ClientResult<SuccessEnvelope> {
    let execution = import::execute_path(options.path, options.stdin_override)?;
    let wanted = options.customer_id.trim();
    let Some(record) = execution
        .scored
        .records
        .iter()
        .find(|record| record.customer_id() == Some(wanted))
    else {
        return Err(ClientError::customer_not_found(wanted));
    };

    let data = CustomerData {
        sheet_used: execution.scored.sheet_name.clone(),
        customer: record.to_json()?,
    };
    success("customer", data)
}
