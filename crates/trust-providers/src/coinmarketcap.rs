//! CoinMarketCap listing and market data.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};
use trust_core::{CertifyError, Result, U256};

use crate::http::{client, endpoint, fetch_json};
use crate::json::Field;

/// Public CoinMarketCap Pro API root.
pub const COINMARKETCAP_API_URL: &str = "https://pro-api.coinmarketcap.com/";

const PROVIDER: &str = "coinmarketcap";

/// Listing facts for one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenMetadata {
    /// CoinMarketCap numeric id, kept as the string key it is returned under.
    pub id: String,
    /// Display name of the token.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// When CoinMarketCap first listed the token.
    pub date_added: DateTime<Utc>,
}

/// Latest market facts for one token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketData {
    /// Whether the token is still actively tracked.
    pub is_active: bool,
    /// 24h USD volume, truncated to an integer.
    pub volume: U256,
    /// USD market capitalisation, truncated to an integer.
    pub market_cap: U256,
}

/// Client for the CoinMarketCap Pro API.
pub struct CoinMarketCap {
    client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for CoinMarketCap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinMarketCap")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CoinMarketCap {
    /// Creates a client rooted at `base_url`, bounding each request by `timeout`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client(PROVIDER, timeout)?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
        })
    }

    /// Looks a token up by contract address.
    #[instrument(skip(self))]
    pub async fn token_metadata(&self, address: &str) -> Result<TokenMetadata> {
        let body = self
            .get("v2/cryptocurrency/info", &[("address", address)])
            .await?;
        let metadata = parse_token_metadata(&body)?;
        debug!(id = %metadata.id, symbol = %metadata.symbol, "token listed");
        Ok(metadata)
    }

    /// Fetches the latest quote for a CoinMarketCap id.
    #[instrument(skip(self))]
    pub async fn market_data(&self, id: &str) -> Result<MarketData> {
        let body = self
            .get("v2/cryptocurrency/quotes/latest", &[("id", id)])
            .await?;
        parse_market_data(&body, id)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = self
            .client
            .get(endpoint(&self.base_url, path))
            .header("Accepts", "application/json")
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .query(query);

        let body = fetch_json(PROVIDER, request, self.timeout).await?;
        check_status(&body)?;
        Ok(body)
    }
}

/// Reads the first listing under `data` of an `info` response.
pub fn parse_token_metadata(body: &Value) -> Result<TokenMetadata> {
    check_status(body)?;
    let (id, entry) = Field::root(PROVIDER, body).get("data")?.first_entry()?;
    let entry = entry.first_if_array()?;

    let added = entry.get("date_added")?;
    let date_added = DateTime::parse_from_rfc3339(added.as_str()?)
        .map_err(|e| {
            CertifyError::missing_fact(PROVIDER, format!("data.{id}.date_added"), e.to_string())
        })?
        .with_timezone(&Utc);

    Ok(TokenMetadata {
        id: id.to_string(),
        name: entry.get("name")?.as_str()?.to_string(),
        symbol: entry.get("symbol")?.as_str()?.to_string(),
        date_added,
    })
}

/// Reads `data.<id>` of a `quotes/latest` response.
pub fn parse_market_data(body: &Value, id: &str) -> Result<MarketData> {
    check_status(body)?;
    let entry = Field::root(PROVIDER, body)
        .get("data")?
        .get(id)?
        .first_if_array()?;
    let usd = entry.get("quote")?.get("USD")?;

    Ok(MarketData {
        is_active: entry.get("is_active")?.as_flag()?,
        volume: usd.get("volume_24h")?.as_amount()?,
        market_cap: usd.get("market_cap")?.as_amount()?,
    })
}

fn check_status(body: &Value) -> Result<()> {
    let Some(status) = body.get("status") else {
        return Ok(());
    };
    let code = status.get("error_code").and_then(Value::as_i64).unwrap_or(0);
    if code == 0 {
        return Ok(());
    }
    let message = status
        .get("error_message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Err(CertifyError::ProviderRequest {
        provider: PROVIDER,
        message: format!("error {code}: {message}"),
    })
}
