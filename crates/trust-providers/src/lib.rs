//! Fact providers for token certification.
//!
//! [`CoinMarketCap`] supplies listing and market data, [`Etherscan`] supplies
//! source verification and total supply, and [`collect_facts`] combines their
//! answers into a [`trust_core::FactSet`]. Responses are treated as untrusted:
//! any absent or mistyped field surfaces as
//! [`trust_core::CertifyError::MissingFact`].

pub mod coinmarketcap;
pub mod collect;
pub mod etherscan;

mod http;
mod json;

pub use coinmarketcap::{COINMARKETCAP_API_URL, CoinMarketCap, MarketData, TokenMetadata};
pub use collect::{collect_facts, days_since};
pub use etherscan::{ETHERSCAN_API_URL, Etherscan};
