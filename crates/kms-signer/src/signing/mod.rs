mod algorithm;
mod public_key;
mod remote;
mod signer;

pub use algorithm::{MessageType, SigningAlgorithm, UnknownAlgorithm};
pub use public_key::{ParseError, PublicKey};
pub use remote::{DEFAULT_RETRIEVAL_TIMEOUT, DEFAULT_SIGN_TIMEOUT, RemoteKeySigner, SignerOptions};
pub use signer::{DigestSigner, SignOptions};
