use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trust_core::{CertifyError, Certification, Certifier, FactSet, OnChainVerifier, ZokratesProver};
use trust_providers::{CoinMarketCap, Etherscan, collect_facts};

mod config;

use config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();

    match run(&config).await {
        Ok(certification) if certification.certified => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            match err.downcast_ref::<CertifyError>() {
                Some(cause) => error!(stage = %cause.stage(), "{err:#}"),
                None => error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config) -> Result<Certification> {
    config.validate()?;
    info!(?config, "starting certification run");

    let market = CoinMarketCap::new(
        config.coinmarketcap_api_url.as_str(),
        config.coinmarketcap_api_key()?,
        config.http_timeout(),
    )?;
    let explorer = Etherscan::new(
        config.etherscan_api_url.as_str(),
        config.etherscan_api_key()?,
        config.http_timeout(),
    )?;

    let facts = collect_facts(&market, &explorer, config.target()?, Utc::now()).await?;
    print_facts(&facts, config.json)?;

    let certifier = Certifier::new(
        ZokratesProver::new(config.prover()),
        OnChainVerifier::new(config.on_chain()?),
    );
    let certification = certifier.certify(&facts).await?;

    print_report(&certification, config.json)?;
    Ok(certification)
}

fn print_facts(facts: &FactSet, json: bool) -> Result<()> {
    let rendered = serde_json::to_string_pretty(facts).context("rendering facts")?;
    if json {
        println!("{rendered}");
    } else {
        println!("Facts:\n{rendered}");
    }
    Ok(())
}

fn print_report(certification: &Certification, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(certification).context("rendering certification")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Certified: {}", certification.certified);
    println!(
        "Score: {:.6} (raw {})",
        certification.normalized_score, certification.score
    );
    println!("Contract address: 0x{}", certification.contract_address);
    println!("Proof digest: {}", certification.proof_digest);
    Ok(())
}
