use std::time::Duration;

use anyhow::{Context, Result, bail};
use aws_config::{BehaviorVersion, Region};
use clap::{Parser, Subcommand};
use kms_signer::{DigestSigner, RemoteKeySigner, SignOptions, SignerOptions, SigningAlgorithm};
use sha2::{Digest, Sha256, Sha384, Sha512};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
struct Args {
    #[clap(long, env = "KMS_KEY_ID")]
    key_id: String,
    #[clap(long, env = "KMS_SIGNING_ALGORITHM", default_value = "ECDSA_SHA_256")]
    signing_algorithm: SigningAlgorithm,
    #[clap(long, env = "AWS_REGION")]
    region: Option<String>,
    /// Override the KMS endpoint (e.g. a local emulator).
    #[clap(long, env = "KMS_ENDPOINT_URL")]
    endpoint_url: Option<String>,
    #[clap(long, default_value = "10")]
    retrieval_timeout_secs: u64,
    #[clap(long, default_value = "10")]
    sign_timeout_secs: u64,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the key's public key (hex DER, or PEM with --pem).
    PublicKey {
        #[clap(long)]
        pem: bool,
    },
    /// Sign a hex digest, or a message hashed locally first.
    Sign {
        #[clap(long, conflicts_with = "message", required_unless_present = "message")]
        digest: Option<String>,
        #[clap(long)]
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = args.region {
        loader = loader.region(Region::new(region));
    }
    if let Some(endpoint_url) = args.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    let sdk_config = loader.load().await;

    let options = SignerOptions::default()
        .with_retrieval_timeout(Duration::from_secs(args.retrieval_timeout_secs))
        .with_sign_timeout(Duration::from_secs(args.sign_timeout_secs));

    let signer = RemoteKeySigner::from_sdk_config(
        &sdk_config,
        args.key_id,
        args.signing_algorithm,
        options,
    )
    .await
    .context("creating KMS signer")?;

    match args.command {
        Command::PublicKey { pem } => {
            if pem {
                let pem = signer
                    .public_key()
                    .to_pem()
                    .context("encoding public key as PEM")?;
                print!("{pem}");
            } else {
                println!("{}", hex::encode(signer.public_key().to_der()));
            }
        }
        Command::Sign { digest, message } => {
            let digest = match (digest, message) {
                (Some(digest), _) => {
                    let hex_str = digest.strip_prefix("0x").unwrap_or(&digest);
                    hex::decode(hex_str).context("decoding digest hex")?
                }
                (None, Some(message)) => hash_message(signer.algorithm(), message.as_bytes())?,
                (None, None) => bail!("either --digest or --message is required"),
            };

            let signature = signer
                .sign_digest(&digest, SignOptions::default())
                .await
                .context("signing digest")?;
            println!("{}", hex::encode(signature));
        }
    }

    Ok(())
}

/// Hash `message` with the hash the signing algorithm expects.
fn hash_message(algorithm: SigningAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
    if algorithm == SigningAlgorithm::Sm2Dsa {
        bail!("local hashing is not available for {algorithm}; pass --digest instead");
    }
    let digest = match algorithm.digest_len() {
        32 => Sha256::digest(message).to_vec(),
        48 => Sha384::digest(message).to_vec(),
        64 => Sha512::digest(message).to_vec(),
        other => bail!("no local hash with a {other}-byte digest"),
    };
    Ok(digest)
}
