//! Proof client: runs the external ZoKrates prover and decodes its artifact.

use std::process::Output;
use std::time::Duration;

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::crypto::bn254;
use crate::error::{CertifyError, Result, Stage};
use crate::types::{Computation, Proof, ProverInput, PublicInputs, PUBLIC_INPUT_LEN};

/// The only curve the EVM verifier can check.
pub const SUPPORTED_CURVE: &str = "bn128";

/// Default working directory of the circuit inside the prover container.
pub const DEFAULT_WORKDIR: &str = "/home/zokrates/krates";

/// Generates a proof for a prover input vector.
#[async_trait]
pub trait Prover: Send + Sync {
    /// Runs the prover once. Implementations must not retry.
    async fn generate_proof(&self, input: &ProverInput) -> Result<Computation>;
}

/// Container runtime invoked by default.
pub const DEFAULT_PROGRAM: &str = "docker";

/// Settings for [`ZokratesProver`].
#[derive(Clone, Debug)]
pub struct ProverConfig {
    /// Docker-compatible CLI to invoke.
    pub program: String,
    /// Container to exec into. Discovered through `docker ps` when unset.
    pub container: Option<String>,
    /// Directory holding the compiled circuit and proving key.
    pub workdir: String,
    /// Bound on each docker invocation.
    pub timeout: Duration,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            container: None,
            workdir: DEFAULT_WORKDIR.to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Prover backed by a running ZoKrates docker container.
///
/// The container keeps witness and proof files in its working directory, so
/// it can only serve one run at a time.
pub struct ZokratesProver {
    config: ProverConfig,
}

impl ZokratesProver {
    /// Creates a prover client.
    pub fn new(config: ProverConfig) -> Self {
        Self { config }
    }

    async fn container_name(&self) -> Result<String> {
        if let Some(name) = &self.config.container {
            self.ensure_running(name).await?;
            return Ok(name.clone());
        }

        let output = self.docker(&["ps"]).await.map_err(unavailable)?;
        let listing = String::from_utf8_lossy(&output.stdout);

        find_container(&listing).ok_or_else(|| {
            CertifyError::ProverUnavailable(
                "no running ZoKrates container found, start ZoKrates first".to_string(),
            )
        })
    }

    /// Fails with [`CertifyError::ProverUnavailable`] unless `name` is a running container.
    async fn ensure_running(&self, name: &str) -> Result<()> {
        let output = self
            .docker(&["inspect", "-f", "{{.State.Running}}", name])
            .await
            .map_err(unavailable)?;

        match String::from_utf8_lossy(&output.stdout).trim() {
            "true" => Ok(()),
            state => Err(CertifyError::ProverUnavailable(format!(
                "container {name} is not running (state: {state})"
            ))),
        }
    }

    /// Runs `docker <args>`, failing on a non-zero exit status.
    async fn docker(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.config.program, ?args, "running docker");

        let run = Command::new(&self.config.program)
            .args(args)
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.config.timeout, run)
            .await
            .map_err(|_| CertifyError::Timeout {
                stage: Stage::Proving,
                after: self.config.timeout,
            })?
            .map_err(|e| {
                CertifyError::ProverUnavailable(format!(
                    "failed to launch {}: {e}",
                    self.config.program
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, %stderr, "docker command failed");
            return Err(CertifyError::ProverExecutionFailed(format!(
                "`docker {}` exited with {}: {}",
                args.first().copied().unwrap_or_default(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }

    async fn exec(&self, container: &str, script: &str) -> Result<Output> {
        self.docker(&["exec", container, "bash", "-c", script]).await
    }
}

#[async_trait]
impl Prover for ZokratesProver {
    async fn generate_proof(&self, input: &ProverInput) -> Result<Computation> {
        let container = self.container_name().await?;
        info!(%container, "computing witness and generating proof");

        let prove = prove_script(&self.config.workdir, input);
        let output = self.exec(&container, &prove).await?;
        debug!(stdout = %String::from_utf8_lossy(&output.stdout), "zokrates finished");

        let read = format!("cd {} && cat proof.json", shell_quote(&self.config.workdir));
        let artifact = self.exec(&container, &read).await?;
        let raw = String::from_utf8_lossy(&artifact.stdout);
        if raw.trim().is_empty() {
            return Err(CertifyError::ProverExecutionFailed(
                "proof artifact is empty".to_string(),
            ));
        }

        let computation = parse_computation(&raw)?;
        info!(
            curve = %computation.curve,
            scheme = %computation.scheme,
            digest = %hex::encode(computation.artifact_digest),
            "proof generated"
        );
        Ok(computation)
    }
}

/// Shell script that computes the witness and the proof in one go.
fn prove_script(workdir: &str, input: &ProverInput) -> String {
    format!(
        "cd {} && zokrates compute-witness -a {} && zokrates generate-proof",
        shell_quote(workdir),
        input.witness_args().join(" ")
    )
}

/// Single-quotes `word` for `bash -c`.
fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// A failed discovery or inspection means there is no prover to run, not a failed run.
fn unavailable(err: CertifyError) -> CertifyError {
    match err {
        CertifyError::ProverExecutionFailed(msg) => CertifyError::ProverUnavailable(msg),
        other => other,
    }
}

/// Picks the first `docker ps` row mentioning ZoKrates and returns its name column.
fn find_container(listing: &str) -> Option<String> {
    listing
        .lines()
        .filter(|line| line.to_ascii_lowercase().contains("zokrates"))
        .find_map(|line| line.split_whitespace().last())
        .map(str::to_string)
}

#[derive(Deserialize)]
struct ProofArtifact {
    curve: String,
    scheme: String,
    proof: ProofArtifactPoints,
    inputs: Vec<String>,
}

#[derive(Deserialize)]
struct ProofArtifactPoints {
    a: [String; 2],
    b: [[String; 2]; 2],
    c: [String; 2],
}

/// Decodes and structurally validates a `proof.json` artifact.
///
/// Every value is parsed as a base-16 word. The curve must be
/// [`SUPPORTED_CURVE`], the public inputs must be canonical scalar field
/// elements and the proof points must lie on their curves. Any violation is
/// [`CertifyError::MalformedProverOutput`].
pub fn parse_computation(raw: &str) -> Result<Computation> {
    let artifact: ProofArtifact = serde_json::from_str(raw)
        .map_err(|e| CertifyError::MalformedProverOutput(format!("invalid proof.json: {e}")))?;

    if artifact.curve != SUPPORTED_CURVE {
        return Err(CertifyError::MalformedProverOutput(format!(
            "unsupported curve {:?}, expected {SUPPORTED_CURVE:?}",
            artifact.curve
        )));
    }

    let proof = Proof {
        a: parse_pair("proof.a", &artifact.proof.a)?,
        b: [
            parse_pair("proof.b[0]", &artifact.proof.b[0])?,
            parse_pair("proof.b[1]", &artifact.proof.b[1])?,
        ],
        c: parse_pair("proof.c", &artifact.proof.c)?,
    };
    if bn254::g1_point(&proof.a).is_none() {
        return Err(off_curve("proof.a"));
    }
    if bn254::g2_point(&proof.b).is_none() {
        return Err(off_curve("proof.b"));
    }
    if bn254::g1_point(&proof.c).is_none() {
        return Err(off_curve("proof.c"));
    }

    let inputs = parse_inputs(&artifact.inputs)?;

    Ok(Computation {
        curve: artifact.curve,
        scheme: artifact.scheme,
        proof,
        inputs,
        artifact_digest: Sha256::digest(raw.as_bytes()).into(),
    })
}

fn parse_inputs(raw: &[String]) -> Result<PublicInputs> {
    if raw.len() != PUBLIC_INPUT_LEN {
        return Err(CertifyError::MalformedProverOutput(format!(
            "expected {PUBLIC_INPUT_LEN} public inputs, got {}",
            raw.len()
        )));
    }

    let mut words = [U256::ZERO; PUBLIC_INPUT_LEN];
    for (i, (word, text)) in words.iter_mut().zip(raw).enumerate() {
        let label = format!("inputs[{i}]");
        *word = parse_hex(&label, text)?;
        if bn254::scalar(word).is_none() {
            return Err(CertifyError::MalformedProverOutput(format!(
                "{label} is not below the scalar field modulus"
            )));
        }
    }

    let [score, signature, address_part1, address_part2] = words;
    Ok(PublicInputs {
        score,
        signature,
        address_part1,
        address_part2,
    })
}

fn parse_pair(label: &str, pair: &[String; 2]) -> Result<[U256; 2]> {
    Ok([
        parse_hex(&format!("{label}[0]"), &pair[0])?,
        parse_hex(&format!("{label}[1]"), &pair[1])?,
    ])
}

/// Parses a base-16 word, with or without a `0x` prefix.
fn parse_hex(label: &str, text: &str) -> Result<U256> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CertifyError::MalformedProverOutput(format!(
            "{label} is not a hex string: {text:?}"
        )));
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| CertifyError::MalformedProverOutput(format!("{label} out of range: {e}")))
}

fn off_curve(label: &str) -> CertifyError {
    CertifyError::MalformedProverOutput(format!("{label} is not a valid BN254 point"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::{G1Affine, G1Projective, G2Affine, G2Projective};
    use ark_ec::Group;
    use ark_ff::PrimeField;
    use serde_json::json;

    fn hex_word(value: impl PrimeField<BigInt = ark_ff::BigInteger256>) -> String {
        format!("0x{:x}", U256::from_limbs(value.into_bigint().0))
    }

    /// A well-formed artifact whose points are the curve generators.
    fn artifact(inputs: [&str; 4]) -> serde_json::Value {
        let g1 = G1Affine::from(G1Projective::generator());
        let g2 = G2Affine::from(G2Projective::generator());
        json!({
            "scheme": "g16",
            "curve": "bn128",
            "proof": {
                "a": [hex_word(g1.x), hex_word(g1.y)],
                "b": [
                    [hex_word(g2.x.c1), hex_word(g2.x.c0)],
                    [hex_word(g2.y.c1), hex_word(g2.y.c0)]
                ],
                "c": [hex_word(g1.x), hex_word(g1.y)]
            },
            "inputs": inputs
        })
    }

    #[test]
    fn parses_well_formed_artifact() {
        let raw = artifact(["0x2a", "0x07", "0x0", "0x1"]).to_string();

        let computation = parse_computation(&raw).unwrap();

        assert_eq!(computation.curve, "bn128");
        assert_eq!(computation.scheme, "g16");
        assert_eq!(computation.proof.a, [U256::from(1u64), U256::from(2u64)]);
        assert_eq!(computation.inputs.score, U256::from(42u64));
        assert_eq!(computation.inputs.signature, U256::from(7u64));
        assert_eq!(computation.inputs.address_part1, U256::ZERO);
        assert_eq!(computation.inputs.address_part2, U256::from(1u64));

        let expected: [u8; 32] = Sha256::digest(raw.as_bytes()).into();
        assert_eq!(computation.artifact_digest, expected);
    }

    #[test]
    fn rejects_bad_hex() {
        let raw = artifact(["0xzz", "0x07", "0x0", "0x1"]).to_string();
        let err = parse_computation(&raw).unwrap_err();
        assert!(matches!(err, CertifyError::MalformedProverOutput(msg) if msg.contains("inputs[0]")));

        let raw = artifact(["0x", "0x07", "0x0", "0x1"]).to_string();
        assert!(matches!(
            parse_computation(&raw),
            Err(CertifyError::MalformedProverOutput(_))
        ));
    }

    #[test]
    fn rejects_wrong_input_count() {
        let mut doc = artifact(["0x1", "0x2", "0x3", "0x4"]);
        doc["inputs"] = json!(["0x1", "0x2", "0x3"]);

        let err = parse_computation(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CertifyError::MalformedProverOutput(msg) if msg.contains("expected 4")));
    }

    #[test]
    fn rejects_input_above_field_prime() {
        let too_big = format!("0x{:x}", bn254::FIELD_PRIME);
        let raw = artifact([too_big.as_str(), "0x1", "0x2", "0x3"]).to_string();

        assert!(matches!(
            parse_computation(&raw),
            Err(CertifyError::MalformedProverOutput(_))
        ));
    }

    #[test]
    fn rejects_off_curve_points() {
        let mut doc = artifact(["0x1", "0x2", "0x3", "0x4"]);
        doc["proof"]["c"] = json!(["0x1", "0x3"]);

        let err = parse_computation(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CertifyError::MalformedProverOutput(msg) if msg.contains("proof.c")));
    }

    #[test]
    fn rejects_unsupported_curve() {
        let mut doc = artifact(["0x1", "0x2", "0x3", "0x4"]);
        doc["curve"] = json!("bls12_381");

        assert!(matches!(
            parse_computation(&doc.to_string()),
            Err(CertifyError::MalformedProverOutput(_))
        ));
    }

    #[test]
    fn rejects_truncated_document() {
        assert!(matches!(
            parse_computation("{\"curve\": \"bn128\""),
            Err(CertifyError::MalformedProverOutput(_))
        ));
    }

    #[test]
    fn finds_zokrates_container() {
        let listing = "\
CONTAINER ID   IMAGE                 COMMAND   CREATED   STATUS   PORTS   NAMES
1f2e3d4c5b6a   postgres:16           \"docker\"  2 days    Up               db
9a8b7c6d5e4f   zokrates/zokrates     \"bash\"    1 hour    Up               eager_turing
";
        assert_eq!(find_container(listing).as_deref(), Some("eager_turing"));
        assert_eq!(find_container("CONTAINER ID   IMAGE\n"), None);
        assert_eq!(find_container(""), None);
    }

    #[test]
    fn prove_script_passes_words_in_order() {
        let input = ProverInput::new([0u64, 1, 10, 1, 500, 2000, 1000, 1].map(U256::from));

        assert_eq!(
            prove_script("/home/zokrates/krates", &input),
            "cd '/home/zokrates/krates' && zokrates compute-witness -a 0 1 10 1 500 2000 1000 1 \
             && zokrates generate-proof"
        );
    }

    #[test]
    fn workdir_is_quoted_for_the_shell() {
        assert_eq!(shell_quote("/tmp/my circuit"), "'/tmp/my circuit'");
        assert_eq!(shell_quote("/tmp/a'b; rm -rf ~"), r"'/tmp/a'\''b; rm -rf ~'");

        let input = ProverInput::new([U256::ZERO; 8]);
        assert!(prove_script("/x && reboot", &input).starts_with("cd '/x && reboot' && zokrates"));
    }
}
