#[allow(unused)]
pub use anyhow::{anyhow, bail, ensure, Error};

/// Description carried by every [`RSAError::DecryptingFailed`].
///
/// It is the same for every cause (bad padding, wrong key, corrupted
/// ciphertext, provider error).
pub const RSA_DECRYPTION_FAILURE: &str = "The encrypted key could not be decrypted";

/// Errors returned by the RSA key unwrapping engine.
///
/// Only the length precondition is reported distinctly. Everything that
/// happens once the private key is used collapses into `DecryptingFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RSAError {
    #[error("Cipher text length does not match the RSA modulus length")]
    CipherTextLengthNotSatisfied,
    #[error("RSA decryption failed: {description}")]
    DecryptingFailed { description: &'static str },
}

impl RSAError {
    pub(crate) fn decrypting_failed() -> Self {
        RSAError::DecryptingFailed {
            description: RSA_DECRYPTION_FAILURE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JWEError {
    #[error("Invalid JWE compact serialization")]
    InvalidJWEFormat,
    #[error("JWE header too large")]
    HeaderTooLarge,
    #[error("Token is too long")]
    TokenTooLong,
    #[error("JWE algorithm mismatch")]
    AlgorithmMismatch,
    #[error("Unsupported key management algorithm: [{0}]")]
    UnsupportedKeyManagementAlgorithm(String),
    #[error("Unsupported content encryption algorithm: [{0}]")]
    UnsupportedContentEncryption(String),
    #[error("Compressed JWE payloads are not supported")]
    UnsupportedCompression,
    #[error("Unknown critical header extension")]
    UnknownCriticalExtension,
    #[error("JWE key identifier mismatch")]
    KeyIdentifierMismatch,
    #[error("Missing JWE key identifier")]
    MissingKeyIdentifier,
    #[error("Invalid content encryption key")]
    InvalidEncryptionKey,
    #[error("Invalid initialization vector")]
    InvalidIV,
    #[error("Invalid JWE authentication tag length")]
    InvalidJWEAuthTag,
    #[error("JWE decryption failed")]
    DecryptionFailed,
    #[error("Plain text length does not fit the RSA modulus and padding")]
    PlainTextLengthNotSatisfied,
    #[error("Key wrapping failed")]
    KeyWrapFailed,
    #[error("Unsupported RSA modulus")]
    UnsupportedRSAModulus,
    #[error("RSA key is too weak")]
    WeakKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid key pair")]
    InvalidKeyPair,
}
