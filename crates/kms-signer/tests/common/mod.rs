#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use k256::ecdsa::{Signature, SigningKey, signature::hazmat::PrehashSigner};
use k256::pkcs8::EncodePublicKey;
use kms_signer::{BoxError, KmsClient, SignRequest, SigningAlgorithm};
use kms_signer::signing::MessageType;
use sha2::{Digest, Sha256};

/// What the mock answers to a sign request.
pub enum SignBehavior {
    /// Sign the digest with the mock's secp256k1 key.
    Real,
    /// Return these bytes verbatim.
    Fixed(Vec<u8>),
    /// Return the digest reversed, so each caller can check it got its own answer.
    EchoReversed,
    Fail(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSign {
    pub key_id: String,
    pub message: Vec<u8>,
    pub message_type: MessageType,
    pub signing_algorithm: SigningAlgorithm,
}

/// In-process stand-in for the key management service.
pub struct MockKms {
    pub signing_key: SigningKey,
    pub public_key_der: Result<Vec<u8>, &'static str>,
    pub sign_behavior: SignBehavior,
    pub get_public_key_delay: Option<Duration>,
    pub sign_delay: Option<Duration>,
    /// When set, only sign requests for this message are delayed.
    pub slow_message: Option<Vec<u8>>,
    pub get_public_key_calls: Mutex<Vec<String>>,
    pub sign_calls: Mutex<Vec<RecordedSign>>,
}

impl MockKms {
    pub fn from_seed(seed: &str) -> Self {
        let hash = Sha256::digest(seed.as_bytes());
        let signing_key = SigningKey::from_bytes((&hash).into()).unwrap();
        let public_key_der = signing_key
            .verifying_key()
            .to_public_key_der()
            .unwrap()
            .into_vec();
        Self {
            signing_key,
            public_key_der: Ok(public_key_der),
            sign_behavior: SignBehavior::Real,
            get_public_key_delay: None,
            sign_delay: None,
            slow_message: None,
            get_public_key_calls: Mutex::new(Vec::new()),
            sign_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_public_key_der(mut self, der: Vec<u8>) -> Self {
        self.public_key_der = Ok(der);
        self
    }

    pub fn with_public_key_error(mut self, error: &'static str) -> Self {
        self.public_key_der = Err(error);
        self
    }

    pub fn with_sign_behavior(mut self, behavior: SignBehavior) -> Self {
        self.sign_behavior = behavior;
        self
    }

    pub fn with_get_public_key_delay(mut self, delay: Duration) -> Self {
        self.get_public_key_delay = Some(delay);
        self
    }

    pub fn with_sign_delay(mut self, delay: Duration) -> Self {
        self.sign_delay = Some(delay);
        self
    }

    pub fn with_sign_delay_for(mut self, message: Vec<u8>, delay: Duration) -> Self {
        self.slow_message = Some(message);
        self.sign_delay = Some(delay);
        self
    }

    pub fn sign_calls(&self) -> Vec<RecordedSign> {
        self.sign_calls.lock().unwrap().clone()
    }

    pub fn get_public_key_calls(&self) -> Vec<String> {
        self.get_public_key_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KmsClient for MockKms {
    async fn get_public_key(&self, key_id: &str) -> Result<Vec<u8>, BoxError> {
        self.get_public_key_calls
            .lock()
            .unwrap()
            .push(key_id.to_string());
        if let Some(delay) = self.get_public_key_delay {
            tokio::time::sleep(delay).await;
        }
        self.public_key_der.clone().map_err(BoxError::from)
    }

    async fn sign(&self, request: SignRequest<'_>) -> Result<Vec<u8>, BoxError> {
        self.sign_calls.lock().unwrap().push(RecordedSign {
            key_id: request.key_id.to_string(),
            message: request.message.to_vec(),
            message_type: request.message_type,
            signing_algorithm: request.signing_algorithm,
        });
        let delayed = self
            .slow_message
            .as_deref()
            .is_none_or(|slow| slow == request.message);
        if let (Some(delay), true) = (self.sign_delay, delayed) {
            tokio::time::sleep(delay).await;
        }
        match &self.sign_behavior {
            SignBehavior::Real => {
                let signature: Signature = self.signing_key.sign_prehash(request.message)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            SignBehavior::Fixed(bytes) => Ok(bytes.clone()),
            SignBehavior::EchoReversed => Ok(request.message.iter().rev().copied().collect()),
            SignBehavior::Fail(error) => Err((*error).into()),
        }
    }
}
