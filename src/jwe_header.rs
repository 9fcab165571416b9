use serde::{Deserialize, Serialize};

/// JWE protected header.
///
/// Only single-recipient compact tokens are handled, so the header carries
/// the key management and content encryption algorithms, plus optional
/// metadata. Fields the decryption pipeline must refuse (`zip`, `crit`) are
/// parsed so that they can be rejected explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JWEHeader {
    /// Key management algorithm (e.g. "RSA1_5", "RSA-OAEP", "RSA-OAEP-256")
    #[serde(rename = "alg")]
    pub algorithm: String,

    /// Content encryption algorithm (e.g. "A256GCM", "A128GCM")
    #[serde(rename = "enc")]
    pub encryption: String,

    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(rename = "cty", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Compression algorithm
    #[serde(rename = "zip", default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,

    /// Critical headers that must be understood
    #[serde(rename = "crit", default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<Vec<String>>,
}

impl JWEHeader {
    pub fn new(algorithm: impl Into<String>, encryption: impl Into<String>) -> Self {
        JWEHeader {
            algorithm: algorithm.into(),
            encryption: encryption.into(),
            key_id: None,
            token_type: None,
            content_type: None,
            compression: None,
            critical: None,
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
