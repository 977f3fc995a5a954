pub mod error;
pub mod kms;
pub mod signing;

pub use error::{BoxError, CallError, ConstructionError, RetrievalError, SignError};
pub use kms::{KmsClient, SignRequest};
pub use signing::{DigestSigner, PublicKey, RemoteKeySigner, SignOptions, SignerOptions, SigningAlgorithm};
