use async_trait::async_trait;

use super::{PublicKey, SigningAlgorithm};
use crate::error::SignError;

/// Per-call options a generic signing consumer may pass along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignOptions {
    /// Algorithm the caller believes the digest is meant for.
    pub algorithm_hint: Option<SigningAlgorithm>,
}

impl SignOptions {
    pub fn with_algorithm_hint(algorithm: SigningAlgorithm) -> Self {
        Self {
            algorithm_hint: Some(algorithm),
        }
    }
}

/// Capability for signing precomputed digests.
///
/// Callers hash first; implementations never hash the input themselves.
/// Signers whose algorithm is fixed at construction accept `opts` but
/// ignore it: the signature is always produced with [`algorithm`](Self::algorithm).
#[async_trait]
pub trait DigestSigner: Send + Sync {
    /// Sign `digest`. Returns raw signature bytes.
    async fn sign_digest(&self, digest: &[u8], opts: SignOptions) -> Result<Vec<u8>, SignError>;

    fn public_key(&self) -> &PublicKey;

    fn algorithm(&self) -> SigningAlgorithm;
}
