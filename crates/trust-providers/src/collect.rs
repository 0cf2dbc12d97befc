//! Assembly of a [`FactSet`] from provider answers.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use trust_core::{FactSet, Result, U256, normalize_address, split_address};

use crate::coinmarketcap::{CoinMarketCap, MarketData, TokenMetadata};
use crate::etherscan::Etherscan;

/// Queries both providers for `target` and builds its fact set.
///
/// The address is validated before any request is sent.
#[instrument(skip(market, explorer, now))]
pub async fn collect_facts(
    market: &CoinMarketCap,
    explorer: &Etherscan,
    target: &str,
    now: DateTime<Utc>,
) -> Result<FactSet> {
    let address = normalize_address(target);
    split_address(&address)?;
    let prefixed = format!("0x{address}");

    let metadata = market.token_metadata(&prefixed).await?;
    let quote = market.market_data(&metadata.id).await?;
    let has_source_code = explorer.contract_source(&prefixed).await?;
    let total_supply = explorer.total_supply(&prefixed).await?;

    let facts = assemble(address, metadata, quote, has_source_code, total_supply, now);
    info!(
        name = %facts.name,
        symbol = %facts.symbol,
        days_ago_added = facts.days_ago_added,
        "facts collected"
    );
    Ok(facts)
}

pub(crate) fn assemble(
    contract_address: String,
    metadata: TokenMetadata,
    quote: MarketData,
    has_source_code: bool,
    total_supply: U256,
    now: DateTime<Utc>,
) -> FactSet {
    FactSet {
        contract_address,
        has_source_code,
        total_supply,
        days_ago_added: days_since(metadata.date_added, now),
        name: metadata.name,
        symbol: metadata.symbol,
        is_active: quote.is_active,
        volume: quote.volume,
        market_cap: quote.market_cap,
    }
}

/// Whole days from `listed` to `now`, zero if `listed` is in the future.
pub fn days_since(listed: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - listed).num_days()).unwrap_or(0)
}
