//! JWE compact serialization: building, parsing and decrypting tokens.

use ct_codecs::{Base64UrlSafeNoPadding, Decoder, Encoder};
use log::debug;

use crate::algorithms::content::{ContentEncryption, CEK};
use crate::error::*;
use crate::jwe_header::JWEHeader;

pub const MAX_JWE_HEADER_LENGTH: usize = 8192;

/// Options for JWE encryption.
#[derive(Clone, Debug, Default)]
pub struct EncryptionOptions {
    /// Content encryption algorithm (default: A256GCM)
    pub content_encryption: ContentEncryption,
    /// Content type header
    pub content_type: Option<String>,
    /// Key ID, overriding the one attached to the key
    pub key_id: Option<String>,
}

/// Options for JWE decryption.
#[derive(Clone, Debug, Default)]
pub struct DecryptionOptions {
    /// Maximum token length to accept
    pub max_token_length: Option<usize>,
    /// Maximum encoded header length to accept (default: 8192)
    pub max_header_length: Option<usize>,
    /// Required key ID
    pub required_key_id: Option<String>,
}

/// JWE token metadata extracted from the header (before decryption).
#[derive(Debug, Clone)]
pub struct JWETokenMetadata {
    header: JWEHeader,
}

impl JWETokenMetadata {
    /// The key management algorithm.
    pub fn algorithm(&self) -> &str {
        &self.header.algorithm
    }

    /// The content encryption algorithm.
    pub fn encryption(&self) -> &str {
        &self.header.encryption
    }

    pub fn key_id(&self) -> Option<&str> {
        self.header.key_id.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header.content_type.as_deref()
    }

    pub fn header(&self) -> &JWEHeader {
        &self.header
    }
}

/// The five encoded segments of a compact JWE.
struct CompactParts<'a> {
    header_b64: &'a str,
    encrypted_key_b64: &'a str,
    iv_b64: &'a str,
    ciphertext_b64: &'a str,
    tag_b64: &'a str,
}

impl<'a> CompactParts<'a> {
    fn split(token: &'a str) -> Result<Self, Error> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 5 {
            debug!("rejecting JWE: {} compact segments", parts.len());
            bail!(JWEError::InvalidJWEFormat);
        }
        Ok(CompactParts {
            header_b64: parts[0],
            encrypted_key_b64: parts[1],
            iv_b64: parts[2],
            ciphertext_b64: parts[3],
            tag_b64: parts[4],
        })
    }
}

fn decode_header(header_b64: &str, max_header_len: usize) -> Result<JWEHeader, Error> {
    if header_b64.len() > max_header_len {
        debug!("rejecting JWE: header is {} bytes", header_b64.len());
        bail!(JWEError::HeaderTooLarge);
    }
    let header_bytes = Base64UrlSafeNoPadding::decode_to_vec(header_b64, None)?;
    let header: JWEHeader = serde_json::from_slice(&header_bytes)?;
    Ok(header)
}

/// Utilities for working with JWE tokens.
pub struct JWEToken;

impl JWEToken {
    /// Build a JWE token from a payload.
    ///
    /// A random CEK and IV are generated for `content_encryption`. The CEK is
    /// handed to `key_wrap_fn`, whose output becomes the encrypted key segment.
    pub fn build<KeyWrapFn>(
        header: &JWEHeader,
        payload: &[u8],
        content_encryption: ContentEncryption,
        key_wrap_fn: KeyWrapFn,
    ) -> Result<String, Error>
    where
        KeyWrapFn: FnOnce(&CEK) -> Result<Vec<u8>, Error>,
    {
        ensure!(
            header.encryption == content_encryption.alg_name(),
            JWEError::UnsupportedContentEncryption(header.encryption.clone())
        );

        let cek = content_encryption.generate_cek();
        let iv = content_encryption.generate_iv();
        let encrypted_key = key_wrap_fn(&cek)?;

        // The AAD is the ASCII encoding of the encoded protected header
        let header_json = serde_json::to_string(header)?;
        let header_b64 = Base64UrlSafeNoPadding::encode_to_string(&header_json)?;
        let (ciphertext, tag) =
            content_encryption.encrypt(&cek, &iv, header_b64.as_bytes(), payload)?;
        drop(cek);

        Ok(format!(
            "{}.{}.{}.{}.{}",
            header_b64,
            Base64UrlSafeNoPadding::encode_to_string(&encrypted_key)?,
            Base64UrlSafeNoPadding::encode_to_string(&iv)?,
            Base64UrlSafeNoPadding::encode_to_string(&ciphertext)?,
            Base64UrlSafeNoPadding::encode_to_string(&tag)?
        ))
    }

    /// Parse and decrypt a JWE token, returning the payload.
    ///
    /// `key_unwrap_fn` receives the header and the decoded encrypted key. If it
    /// fails, or returns a key whose length doesn't match the content
    /// encryption algorithm, a random CEK is used instead (RFC 7516, section
    /// 11.5). The token then fails content authentication, exactly like a
    /// token with a tampered payload.
    pub fn decrypt<KeyUnwrapFn>(
        expected_alg: &str,
        token: &str,
        options: Option<DecryptionOptions>,
        key_unwrap_fn: KeyUnwrapFn,
    ) -> Result<Vec<u8>, Error>
    where
        KeyUnwrapFn: FnOnce(&JWEHeader, &[u8]) -> Result<CEK, Error>,
    {
        let options = options.unwrap_or_default();

        if let Some(max_len) = options.max_token_length {
            ensure!(token.len() <= max_len, JWEError::TokenTooLong);
        }

        let parts = CompactParts::split(token)?;
        let max_header_len = options.max_header_length.unwrap_or(MAX_JWE_HEADER_LENGTH);
        let header = decode_header(parts.header_b64, max_header_len)?;

        // No critical extension is understood
        if let Some(crit) = &header.critical {
            if !crit.is_empty() {
                debug!("rejecting JWE: unknown critical header extension");
                bail!(JWEError::UnknownCriticalExtension);
            }
        }
        if header.compression.is_some() {
            debug!("rejecting JWE: compressed payload");
            bail!(JWEError::UnsupportedCompression);
        }
        if header.algorithm != expected_alg {
            debug!(
                "rejecting JWE: algorithm is {}, expected {}",
                header.algorithm, expected_alg
            );
            bail!(JWEError::AlgorithmMismatch);
        }

        if let Some(required_key_id) = &options.required_key_id {
            match &header.key_id {
                Some(key_id) => {
                    ensure!(key_id == required_key_id, JWEError::KeyIdentifierMismatch)
                }
                None => bail!(JWEError::MissingKeyIdentifier),
            }
        }

        let content_encryption = ContentEncryption::from_alg_name(&header.encryption)?;

        let encrypted_key = Base64UrlSafeNoPadding::decode_to_vec(parts.encrypted_key_b64, None)?;
        let iv = Base64UrlSafeNoPadding::decode_to_vec(parts.iv_b64, None)?;
        let ciphertext = Base64UrlSafeNoPadding::decode_to_vec(parts.ciphertext_b64, None)?;
        let tag = Base64UrlSafeNoPadding::decode_to_vec(parts.tag_b64, None)?;

        // The substitute is drawn whether or not the unwrap succeeds
        let substitute = content_encryption.generate_cek();
        let cek = match key_unwrap_fn(&header, &encrypted_key) {
            Ok(cek) if cek.len() == content_encryption.key_size() => cek,
            _ => substitute,
        };

        let plaintext = content_encryption.decrypt(
            &cek,
            &iv,
            parts.header_b64.as_bytes(),
            &ciphertext,
            &tag,
        )?;
        drop(cek);

        Ok(plaintext)
    }

    /// Decode JWE token metadata without decrypting.
    ///
    /// This allows inspection of the header to determine which key to use
    /// for decryption.
    pub fn decode_metadata(token: &str) -> Result<JWETokenMetadata, Error> {
        let parts = CompactParts::split(token)?;
        let header = decode_header(parts.header_b64, MAX_JWE_HEADER_LENGTH)?;
        Ok(JWETokenMetadata { header })
    }
}
