//! Key management algorithm identifiers for JWE.
//!
//! Each identifier resolves to exactly one RSA padding scheme, and for OAEP,
//! one hash function used both as the label hash and for MGF1.

use std::fmt;
use std::str::FromStr;

use rsa::Oaep;

use crate::error::*;

/// RSA key management algorithms (RFC 7518, section 4.2 and 4.3).
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyManagementAlgorithm {
    /// RSAES-PKCS1-v1_5
    RSA1_5,
    /// RSAES-OAEP using SHA-1 and MGF1 with SHA-1
    RSA_OAEP,
    /// RSAES-OAEP using SHA-256 and MGF1 with SHA-256
    RSA_OAEP_256,
}

/// Padding scheme passed to the RSA primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RSAPadding {
    Pkcs1v15,
    Oaep(OAEPHash),
}

/// Hash function used by OAEP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAEPHash {
    Sha1,
    Sha256,
}

impl KeyManagementAlgorithm {
    /// All supported algorithms.
    pub const ALL: [KeyManagementAlgorithm; 3] = [
        KeyManagementAlgorithm::RSA1_5,
        KeyManagementAlgorithm::RSA_OAEP,
        KeyManagementAlgorithm::RSA_OAEP_256,
    ];

    /// Get the JWE "alg" header value for this algorithm.
    pub fn alg_name(&self) -> &'static str {
        match self {
            KeyManagementAlgorithm::RSA1_5 => "RSA1_5",
            KeyManagementAlgorithm::RSA_OAEP => "RSA-OAEP",
            KeyManagementAlgorithm::RSA_OAEP_256 => "RSA-OAEP-256",
        }
    }

    /// Parse a key management algorithm from its JWE name.
    pub fn from_alg_name(name: &str) -> Result<Self, Error> {
        match name {
            "RSA1_5" => Ok(KeyManagementAlgorithm::RSA1_5),
            "RSA-OAEP" => Ok(KeyManagementAlgorithm::RSA_OAEP),
            "RSA-OAEP-256" => Ok(KeyManagementAlgorithm::RSA_OAEP_256),
            _ => bail!(JWEError::UnsupportedKeyManagementAlgorithm(
                name.to_string()
            )),
        }
    }

    /// The padding scheme this algorithm uses.
    pub fn padding(&self) -> RSAPadding {
        match self {
            KeyManagementAlgorithm::RSA1_5 => RSAPadding::Pkcs1v15,
            KeyManagementAlgorithm::RSA_OAEP => RSAPadding::Oaep(OAEPHash::Sha1),
            KeyManagementAlgorithm::RSA_OAEP_256 => RSAPadding::Oaep(OAEPHash::Sha256),
        }
    }
}

impl fmt::Display for KeyManagementAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alg_name())
    }
}

impl FromStr for KeyManagementAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_alg_name(s)
    }
}

impl RSAPadding {
    /// Largest message that can be wrapped with a modulus of `modulus_len` bytes.
    pub fn max_plain_text_length(&self, modulus_len: usize) -> usize {
        match self {
            RSAPadding::Pkcs1v15 => modulus_len.saturating_sub(11),
            RSAPadding::Oaep(hash) => modulus_len.saturating_sub(2 * hash.output_len() + 2),
        }
    }
}

impl OAEPHash {
    /// Digest size in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            OAEPHash::Sha1 => 20,
            OAEPHash::Sha256 => 32,
        }
    }

    pub(crate) fn oaep(&self) -> Oaep {
        match self {
            OAEPHash::Sha1 => Oaep::new::<sha1::Sha1>(),
            OAEPHash::Sha256 => Oaep::new::<sha2::Sha256>(),
        }
    }
}
