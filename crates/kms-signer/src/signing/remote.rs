use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::signer::{DigestSigner, SignOptions};
use super::{MessageType, PublicKey, SigningAlgorithm};
use crate::error::{BoxError, CallError, ConstructionError, RetrievalError, SignError};
use crate::kms::{KmsClient, SignRequest};

pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeouts applied to each remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerOptions {
    /// Bound on the public key fetch done during construction.
    pub retrieval_timeout: Duration,
    /// Bound on each sign call.
    pub sign_timeout: Duration,
}

impl Default for SignerOptions {
    fn default() -> Self {
        Self {
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
            sign_timeout: DEFAULT_SIGN_TIMEOUT,
        }
    }
}

impl SignerOptions {
    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    pub fn with_sign_timeout(mut self, timeout: Duration) -> Self {
        self.sign_timeout = timeout;
        self
    }
}

/// Signs digests with a key that never leaves the key management service.
///
/// The public key is fetched once by [`RemoteKeySigner::new`] and cached for
/// the lifetime of the signer. Every [`sign_digest`](DigestSigner::sign_digest)
/// call is a single remote round trip bounded by the sign timeout.
pub struct RemoteKeySigner<C> {
    client: C,
    key_id: String,
    algorithm: SigningAlgorithm,
    retrieval_timeout: Duration,
    sign_timeout: Duration,
    public_key: PublicKey,
}

impl RemoteKeySigner<aws_sdk_kms::Client> {
    /// Build a KMS client from `config` and create a signer on top of it.
    pub async fn from_sdk_config(
        config: &aws_config::SdkConfig,
        key_id: impl Into<String>,
        algorithm: SigningAlgorithm,
        options: SignerOptions,
    ) -> Result<Self, ConstructionError> {
        Self::new(aws_sdk_kms::Client::new(config), key_id, algorithm, options).await
    }
}

impl<C: KmsClient> RemoteKeySigner<C> {
    /// Create a signer for `key_id`, fetching and caching its public key.
    ///
    /// Fails without producing a signer if the key cannot be retrieved or
    /// decoded.
    pub async fn new(
        client: C,
        key_id: impl Into<String>,
        algorithm: SigningAlgorithm,
        options: SignerOptions,
    ) -> Result<Self, ConstructionError> {
        let key_id = key_id.into();
        if key_id.is_empty() {
            return Err(ConstructionError::EmptyKeyId);
        }

        let der = bounded(options.retrieval_timeout, client.get_public_key(&key_id))
            .await
            .map_err(|source| {
                warn!(key_id = %key_id, error = %source, "public key retrieval failed");
                RetrievalError {
                    key_id: key_id.clone(),
                    source,
                }
            })?;

        let public_key = PublicKey::from_der(&der).map_err(|source| ConstructionError::Parse {
            key_id: key_id.clone(),
            source,
        })?;

        debug!(key_id = %key_id, kind = public_key.kind(), %algorithm, "cached KMS public key");

        Ok(Self {
            client,
            key_id,
            algorithm,
            retrieval_timeout: options.retrieval_timeout,
            sign_timeout: options.sign_timeout,
            public_key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Bound that was applied to the public key fetch at construction.
    pub fn retrieval_timeout(&self) -> Duration {
        self.retrieval_timeout
    }

    pub fn sign_timeout(&self) -> Duration {
        self.sign_timeout
    }
}

#[async_trait]
impl<C: KmsClient> DigestSigner for RemoteKeySigner<C> {
    /// Sign a precomputed digest with the configured algorithm.
    ///
    /// `_opts` is ignored; the algorithm was fixed at construction.
    async fn sign_digest(&self, digest: &[u8], _opts: SignOptions) -> Result<Vec<u8>, SignError> {
        debug!(
            key_id = %self.key_id,
            algorithm = %self.algorithm,
            digest_len = digest.len(),
            "signing digest with KMS"
        );

        let request = SignRequest {
            key_id: &self.key_id,
            message: digest,
            message_type: MessageType::Digest,
            signing_algorithm: self.algorithm,
        };

        bounded(self.sign_timeout, self.client.sign(request))
            .await
            .map_err(|source| {
                warn!(key_id = %self.key_id, error = %source, "KMS sign failed");
                SignError {
                    key_id: self.key_id.clone(),
                    source,
                }
            })
    }

    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }
}

/// Run one remote call under its own deadline. Expiry drops the call.
async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, CallError>
where
    F: Future<Output = Result<T, BoxError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(CallError::Service),
        Err(_) => Err(CallError::Timeout(timeout)),
    }
}
