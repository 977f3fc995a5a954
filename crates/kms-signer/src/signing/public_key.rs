use spki::der::Decode;
use spki::der::pem::LineEnding;
use spki::{DecodePublicKey, Document, ObjectIdentifier, SubjectPublicKeyInfoRef};

/// `id-ecPublicKey` (RFC 5480).
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
/// `rsaEncryption` (RFC 8017).
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

const SECP256K1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.10");
const SECP256R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed SubjectPublicKeyInfo: {0}")]
    Malformed(spki::der::Error),
    #[error("unsupported public key algorithm {0}")]
    UnsupportedAlgorithm(ObjectIdentifier),
    #[error("EC public key without a named curve: {0}")]
    MissingCurve(spki::Error),
    #[error("unsupported elliptic curve {0}")]
    UnsupportedCurve(ObjectIdentifier),
    #[error("invalid {kind} public key: {source}")]
    InvalidKey {
        kind: &'static str,
        #[source]
        source: spki::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyMaterial {
    Secp256k1(k256::PublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
    Rsa(rsa::RsaPublicKey),
}

/// Public half of a remote key, decoded from its PKIX encoding.
///
/// The DER bytes the service returned are kept alongside the decoded key so
/// they can be handed back out unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    material: KeyMaterial,
    der: Vec<u8>,
}

impl PublicKey {
    /// Decode a DER-encoded SubjectPublicKeyInfo.
    pub fn from_der(der: &[u8]) -> Result<Self, ParseError> {
        let info = SubjectPublicKeyInfoRef::from_der(der).map_err(ParseError::Malformed)?;

        let material = if info.algorithm.oid == EC_PUBLIC_KEY_OID {
            let curve = info
                .algorithm
                .parameters_oid()
                .map_err(ParseError::MissingCurve)?;
            if curve == SECP256K1_OID {
                KeyMaterial::Secp256k1(decode(der, "secp256k1")?)
            } else if curve == SECP256R1_OID {
                KeyMaterial::P256(decode(der, "p256")?)
            } else if curve == SECP384R1_OID {
                KeyMaterial::P384(decode(der, "p384")?)
            } else {
                return Err(ParseError::UnsupportedCurve(curve));
            }
        } else if info.algorithm.oid == RSA_ENCRYPTION_OID {
            KeyMaterial::Rsa(decode(der, "rsa")?)
        } else {
            return Err(ParseError::UnsupportedAlgorithm(info.algorithm.oid));
        };

        Ok(Self {
            material,
            der: der.to_vec(),
        })
    }

    /// Short key type name (e.g. "secp256k1", "rsa").
    pub fn kind(&self) -> &'static str {
        match self.material {
            KeyMaterial::Secp256k1(_) => "secp256k1",
            KeyMaterial::P256(_) => "p256",
            KeyMaterial::P384(_) => "p384",
            KeyMaterial::Rsa(_) => "rsa",
        }
    }

    pub fn is_ec(&self) -> bool {
        !matches!(self.material, KeyMaterial::Rsa(_))
    }

    pub fn as_secp256k1(&self) -> Option<&k256::PublicKey> {
        match &self.material {
            KeyMaterial::Secp256k1(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_p256(&self) -> Option<&p256::PublicKey> {
        match &self.material {
            KeyMaterial::P256(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_p384(&self) -> Option<&p384::PublicKey> {
        match &self.material {
            KeyMaterial::P384(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_rsa(&self) -> Option<&rsa::RsaPublicKey> {
        match &self.material {
            KeyMaterial::Rsa(key) => Some(key),
            _ => None,
        }
    }

    /// The DER SubjectPublicKeyInfo exactly as received.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> Result<String, spki::der::Error> {
        Document::try_from(self.der.as_slice())?.to_pem("PUBLIC KEY", LineEnding::LF)
    }
}

fn decode<K: DecodePublicKey>(der: &[u8], kind: &'static str) -> Result<K, ParseError> {
    K::from_public_key_der(der).map_err(|source| ParseError::InvalidKey { kind, source })
}
