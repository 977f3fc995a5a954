use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::{MessageType as AwsMessageType, SigningAlgorithmSpec};

use crate::error::BoxError;
use crate::signing::{MessageType, SigningAlgorithm};

/// A single request to the service's "sign" operation.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    pub key_id: &'a str,
    pub message: &'a [u8],
    pub message_type: MessageType,
    pub signing_algorithm: SigningAlgorithm,
}

/// The two key management service operations a remote signer needs.
///
/// Implementations must be safe to call concurrently; callers add no
/// locking around them.
#[async_trait]
pub trait KmsClient: Send + Sync {
    /// DER-encoded SubjectPublicKeyInfo of `key_id`.
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, BoxError>;

    /// Raw signature bytes for `request`.
    async fn sign(&self, request: SignRequest<'_>) -> Result<Vec<u8>, BoxError>;
}

#[async_trait]
impl<T: KmsClient + ?Sized> KmsClient for Arc<T> {
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, BoxError> {
        (**self).get_public_key(key_id).await
    }

    async fn sign(&self, request: SignRequest<'_>) -> Result<Vec<u8>, BoxError> {
        (**self).sign(request).await
    }
}

#[derive(Debug, thiserror::Error)]
#[error("KMS {operation} response did not include a {field}")]
struct MissingField {
    operation: &'static str,
    field: &'static str,
}

/// An SDK failure whose message carries the full cause chain.
#[derive(Debug, thiserror::Error)]
#[error("KMS {operation} failed: {context}")]
struct SdkCallError {
    operation: &'static str,
    context: String,
    #[source]
    source: BoxError,
}

fn sdk_error<E>(operation: &'static str, err: E) -> BoxError
where
    E: std::error::Error + Send + Sync + 'static,
{
    let context = DisplayErrorContext(&err).to_string();
    Box::new(SdkCallError {
        operation,
        context,
        source: Box::new(err),
    })
}

#[async_trait]
impl KmsClient for aws_sdk_kms::Client {
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, BoxError> {
        let output = self
            .get_public_key()
            .key_id(key_id)
            .send()
            .await
            .map_err(|err| sdk_error("GetPublicKey", err.into_service_error()))?;

        output
            .public_key()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| {
                MissingField {
                    operation: "GetPublicKey",
                    field: "public key",
                }
                .into()
            })
    }

    async fn sign(&self, request: SignRequest<'_>) -> Result<Vec<u8>, BoxError> {
        let message_type = match request.message_type {
            MessageType::Raw => AwsMessageType::Raw,
            MessageType::Digest => AwsMessageType::Digest,
        };

        let output = self
            .sign()
            .key_id(request.key_id)
            .message(Blob::new(request.message))
            .message_type(message_type)
            .signing_algorithm(SigningAlgorithmSpec::from(request.signing_algorithm.as_str()))
            .send()
            .await
            .map_err(|err| sdk_error("Sign", err.into_service_error()))?;

        output
            .signature()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| {
                MissingField {
                    operation: "Sign",
                    field: "signature",
                }
                .into()
            })
    }
}
