use std::error::Error;
use std::time::Duration;

use crate::signing::ParseError;

/// Error type returned by [`KmsClient`](crate::KmsClient) implementations.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Failure of a single bounded remote call.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Service(BoxError),
}

impl CallError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// The "get public key" call failed (network, permissions, unknown key, timeout).
#[derive(Debug, thiserror::Error)]
#[error("failed to get public key {key_id} from KMS: {source}")]
pub struct RetrievalError {
    pub key_id: String,
    #[source]
    pub source: CallError,
}

impl RetrievalError {
    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }
}

/// A signer could not be built. No instance exists when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("failed to create signer: empty KMS key id")]
    EmptyKeyId,
    #[error("failed to retrieve public key for signer: {0}")]
    Retrieval(#[from] RetrievalError),
    #[error("failed to parse public key {key_id} from KMS as a PKIX public key: {source}")]
    Parse {
        key_id: String,
        #[source]
        source: ParseError,
    },
}

impl ConstructionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Retrieval(err) if err.is_timeout())
    }
}

/// The "sign" call failed (timeout, permissions, key state, algorithm mismatch).
#[derive(Debug, thiserror::Error)]
#[error("failed to sign digest with KMS key {key_id}: {source}")]
pub struct SignError {
    pub key_id: String,
    #[source]
    pub source: CallError,
}

impl SignError {
    pub fn is_timeout(&self) -> bool {
        self.source.is_timeout()
    }
}
