//! Etherscan contract and token statistics.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::instrument;
use trust_core::{CertifyError, Result, U256};

use crate::http::{client, fetch_json};
use crate::json::Field;

/// Public Etherscan API endpoint.
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

const PROVIDER: &str = "etherscan";

/// Etherscan reports "nothing here" as a failed status with this message.
const NO_DATA: &str = "No data found";

/// Client for the Etherscan account and contract API.
pub struct Etherscan {
    client: Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for Etherscan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Etherscan")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Etherscan {
    /// Creates a client for `api_url`, bounding each request by `timeout`.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client(PROVIDER, timeout)?,
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    /// Whether the contract has verified source published.
    #[instrument(skip(self))]
    pub async fn contract_source(&self, address: &str) -> Result<bool> {
        let body = self
            .get(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address),
            ])
            .await?;
        parse_contract_source(&body)
    }

    /// ERC-20 total supply in the token's smallest unit.
    #[instrument(skip(self))]
    pub async fn total_supply(&self, address: &str) -> Result<U256> {
        let body = self
            .get(&[
                ("module", "stats"),
                ("action", "tokensupply"),
                ("contractaddress", address),
            ])
            .await?;
        parse_total_supply(&body)
    }

    async fn get(&self, query: &[(&str, &str)]) -> Result<Value> {
        let request = self
            .client
            .get(&self.api_url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())]);
        fetch_json(PROVIDER, request, self.timeout).await
    }
}

/// `true` iff `result[0].SourceCode` is a non-empty string.
pub fn parse_contract_source(body: &Value) -> Result<bool> {
    check_status(body)?;
    let result = Field::root(PROVIDER, body).get("result")?;
    match result.value() {
        Value::Array(entries) if entries.is_empty() => Ok(false),
        Value::Array(_) => Ok(!result
            .first_if_array()?
            .get("SourceCode")?
            .as_str()?
            .is_empty()),
        Value::String(_) => Ok(false),
        _ => Err(CertifyError::missing_fact(PROVIDER, "result", "expected an array")),
    }
}

/// Reads the decimal `result` string of a `tokensupply` response.
pub fn parse_total_supply(body: &Value) -> Result<U256> {
    check_status(body)?;
    Field::root(PROVIDER, body).get("result")?.as_amount()
}

fn check_status(body: &Value) -> Result<()> {
    if body.get("status").and_then(Value::as_str) != Some("0") {
        return Ok(());
    }
    let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
    if message.is_empty() || message == NO_DATA {
        return Ok(());
    }
    // On errors Etherscan puts the detail in `result`.
    let detail = body.get("result").and_then(Value::as_str).unwrap_or(message);
    Err(CertifyError::ProviderRequest {
        provider: PROVIDER,
        message: detail.to_string(),
    })
}
