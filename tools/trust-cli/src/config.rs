use std::time::Duration;

use clap::Parser;
use trust_core::{
    Address, CertifyError, DEFAULT_PROGRAM, OnChainConfig, ProverConfig, Result, parse_private_key,
    prover::DEFAULT_WORKDIR,
};
use trust_providers::{COINMARKETCAP_API_URL, ETHERSCAN_API_URL};

/// Certify a token contract's trust score with a zero-knowledge proof
#[derive(Parser, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Hex key signing the verification transaction
    #[arg(long, value_name = "HEX", env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Etherscan API key
    #[arg(long, value_name = "KEY", env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// CoinMarketCap Pro API key
    #[arg(long, value_name = "KEY", env = "COINMARKETCAP_API_KEY", hide_env_values = true)]
    pub coinmarketcap_api_key: Option<String>,

    /// Token contract to certify, with or without 0x
    #[arg(long, value_name = "ADDRESS", env = "TARGET_CONTRACT_ADDRESS")]
    pub target_contract_address: Option<String>,

    /// Deployed verifier contract
    #[arg(long, value_name = "ADDRESS", env = "VERIFIER_CONTRACT_ADDRESS")]
    pub verifier_contract_address: Option<String>,

    /// JSON-RPC endpoint of the chain hosting the verifier
    #[arg(long, value_name = "URL", env = "ETHEREUM_RPC_URL")]
    pub ethereum_rpc_url: Option<String>,

    /// ZoKrates container name; discovered with `docker ps` when omitted
    #[arg(long, value_name = "NAME", env = "PROVER_CONTAINER")]
    pub prover_container: Option<String>,

    /// Docker-compatible CLI used to reach the prover container
    #[arg(long, value_name = "PATH", env = "DOCKER_PROGRAM", default_value = DEFAULT_PROGRAM)]
    pub docker_program: String,

    /// Circuit directory inside the prover container
    #[arg(long, value_name = "PATH", env = "PROVER_WORKDIR", default_value = DEFAULT_WORKDIR)]
    pub prover_workdir: String,

    /// Bound on each prover invocation
    #[arg(long, value_name = "SECS", env = "PROVER_TIMEOUT_SECS", default_value_t = 600)]
    pub prover_timeout_secs: u64,

    /// Bound on each provider request
    #[arg(long, value_name = "SECS", env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Bound on transaction submission, inclusion and the verdict call, each
    #[arg(long, value_name = "SECS", env = "CHAIN_TIMEOUT_SECS", default_value_t = 120)]
    pub chain_timeout_secs: u64,

    /// Fixed gas limit for the verification transaction
    #[arg(long, value_name = "GAS", env = "GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// Etherscan API endpoint
    #[arg(long, value_name = "URL", env = "ETHERSCAN_API_URL", default_value = ETHERSCAN_API_URL)]
    pub etherscan_api_url: String,

    /// CoinMarketCap Pro API root
    #[arg(long, value_name = "URL", env = "COINMARKETCAP_API_URL", default_value = COINMARKETCAP_API_URL)]
    pub coinmarketcap_api_url: String,

    /// Print the facts and the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("private_key", &redacted(&self.private_key))
            .field("etherscan_api_key", &redacted(&self.etherscan_api_key))
            .field("coinmarketcap_api_key", &redacted(&self.coinmarketcap_api_key))
            .field("target_contract_address", &self.target_contract_address)
            .field("verifier_contract_address", &self.verifier_contract_address)
            .field("ethereum_rpc_url", &self.ethereum_rpc_url)
            .field("docker_program", &self.docker_program)
            .field("prover_container", &self.prover_container)
            .field("prover_workdir", &self.prover_workdir)
            .field("prover_timeout_secs", &self.prover_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("chain_timeout_secs", &self.chain_timeout_secs)
            .field("gas_limit", &self.gas_limit)
            .field("etherscan_api_url", &self.etherscan_api_url)
            .field("coinmarketcap_api_url", &self.coinmarketcap_api_url)
            .field("json", &self.json)
            .finish()
    }
}

fn redacted(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CertifyError::Configuration(format!("{name} is required"))),
    }
}

impl Config {
    /// Rejects missing or unusable settings before anything is contacted.
    pub fn validate(&self) -> Result<()> {
        parse_private_key(require(&self.private_key, "PRIVATE_KEY")?)?;
        require(&self.etherscan_api_key, "ETHERSCAN_API_KEY")?;
        require(&self.coinmarketcap_api_key, "COINMARKETCAP_API_KEY")?;
        require(&self.target_contract_address, "TARGET_CONTRACT_ADDRESS")?;
        require(&self.ethereum_rpc_url, "ETHEREUM_RPC_URL")?;
        self.verifier_address()?;

        for (name, secs) in [
            ("PROVER_TIMEOUT_SECS", self.prover_timeout_secs),
            ("HTTP_TIMEOUT_SECS", self.http_timeout_secs),
            ("CHAIN_TIMEOUT_SECS", self.chain_timeout_secs),
        ] {
            if secs == 0 {
                return Err(CertifyError::Configuration(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// Contract to certify, as supplied.
    pub fn target(&self) -> Result<&str> {
        require(&self.target_contract_address, "TARGET_CONTRACT_ADDRESS")
    }

    /// Etherscan API key.
    pub fn etherscan_api_key(&self) -> Result<&str> {
        require(&self.etherscan_api_key, "ETHERSCAN_API_KEY")
    }

    /// CoinMarketCap API key.
    pub fn coinmarketcap_api_key(&self) -> Result<&str> {
        require(&self.coinmarketcap_api_key, "COINMARKETCAP_API_KEY")
    }

    /// Bound on each provider request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Settings for the ZoKrates proof client.
    pub fn prover(&self) -> ProverConfig {
        ProverConfig {
            program: self.docker_program.clone(),
            container: self.prover_container.clone().filter(|c| !c.trim().is_empty()),
            workdir: self.prover_workdir.clone(),
            timeout: Duration::from_secs(self.prover_timeout_secs),
        }
    }

    /// Settings for the verifier gateway.
    pub fn on_chain(&self) -> Result<OnChainConfig> {
        Ok(OnChainConfig {
            rpc_url: require(&self.ethereum_rpc_url, "ETHEREUM_RPC_URL")?.to_string(),
            verifier_address: self.verifier_address()?,
            private_key: require(&self.private_key, "PRIVATE_KEY")?.to_string(),
            timeout: Duration::from_secs(self.chain_timeout_secs),
            gas_limit: self.gas_limit,
        })
    }

    fn verifier_address(&self) -> Result<Address> {
        let raw = require(&self.verifier_contract_address, "VERIFIER_CONTRACT_ADDRESS")?;
        raw.parse::<Address>().map_err(|e| {
            CertifyError::Configuration(format!("VERIFIER_CONTRACT_ADDRESS {raw:?}: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERIFIER: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["trust-certify"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    fn complete() -> Config {
        parse(&[
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            "--etherscan-api-key",
            "es-key",
            "--coinmarketcap-api-key",
            "cmc-key",
            "--target-contract-address",
            "0x8236a87084f8b84306f72007f36f2618a5634494",
            "--verifier-contract-address",
            VERIFIER,
            "--ethereum-rpc-url",
            "http://127.0.0.1:8545",
        ])
    }

    #[test]
    fn complete_config_validates() {
        let config = complete();
        config.validate().unwrap();

        let chain = config.on_chain().unwrap();
        assert_eq!(chain.verifier_address, VERIFIER.parse::<Address>().unwrap());
        assert_eq!(chain.timeout, Duration::from_secs(120));
        assert_eq!(chain.gas_limit, None);

        let prover = config.prover();
        assert_eq!(prover.program, DEFAULT_PROGRAM);
        assert_eq!(prover.container, None);
        assert_eq!(prover.workdir, DEFAULT_WORKDIR);
        assert_eq!(prover.timeout, Duration::from_secs(600));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn empty_required_value_is_configuration_error() {
        let mut config = complete();
        config.etherscan_api_key = Some("  ".to_string());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CertifyError::Configuration(_)));
        assert!(err.to_string().contains("ETHERSCAN_API_KEY"));
    }

    #[test]
    fn absent_required_value_is_configuration_error() {
        let mut config = complete();
        config.ethereum_rpc_url = None;
        assert!(matches!(config.validate(), Err(CertifyError::Configuration(_))));
    }

    #[test]
    fn bad_verifier_address_is_configuration_error() {
        let mut config = complete();
        config.verifier_contract_address = Some("0x1234".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("VERIFIER_CONTRACT_ADDRESS"));
    }

    #[test]
    fn malformed_private_key_fails_validation() {
        let mut config = complete();
        config.private_key = Some("0xdeadbeef".to_string());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CertifyError::Configuration(_)));
        assert!(err.to_string().contains("private key"));
        assert!(!err.to_string().contains("deadbeef"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = complete();
        config.chain_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn gas_override_reaches_chain_config() {
        let mut config = complete();
        config.gas_limit = Some(2_000_000);
        assert_eq!(config.on_chain().unwrap().gas_limit, Some(2_000_000));
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("ac0974bec39a17e3"));
        assert!(!rendered.contains("es-key"));
        assert!(!rendered.contains("cmc-key"));
        assert!(rendered.contains("<redacted>"));
    }
}
