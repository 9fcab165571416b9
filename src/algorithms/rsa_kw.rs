//! RSA key management for JWE (RSA1_5, RSA-OAEP, RSA-OAEP-256).
//!
//! [`RSADecrypter`] recovers a content encryption key from the JWE encrypted
//! key segment. Whatever goes wrong once the private key is involved, it
//! returns the same [`RSAError::DecryptingFailed`] value, so that callers
//! cannot be turned into a padding oracle. The only distinct failure is the
//! ciphertext length check, which depends on public data alone.

#[cfg(all(
    feature = "optimal",
    not(feature = "pure-rust"),
    not(any(target_arch = "wasm32", target_arch = "wasm64"))
))]
use boring::{pkey::Private, rsa::Padding, rsa::Rsa};
use log::{debug, trace};
#[cfg(all(
    feature = "optimal",
    not(feature = "pure-rust"),
    not(any(target_arch = "wasm32", target_arch = "wasm64"))
))]
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

use super::content::CEK;
use super::key_management::{KeyManagementAlgorithm, RSAPadding};
use crate::error::*;
use crate::jwe_header::JWEHeader;
use crate::jwe_token::{DecryptionOptions, EncryptionOptions, JWEToken};

const MIN_RSA_MODULUS_BITS: usize = 2048;

/// Returns `true` if `cipher_text` has exactly the modulus length.
///
/// This only looks at public data (the ciphertext length and the key size),
/// so its result can be reported without creating an oracle.
pub fn cipher_text_length_satisfied(modulus_len: usize, cipher_text: &[u8]) -> bool {
    !cipher_text.is_empty() && cipher_text.len() == modulus_len
}

/// RSA public key, used to wrap content encryption keys.
#[derive(Debug, Clone)]
pub struct RSAPublicKey {
    pk: RsaPublicKey,
    key_id: Option<String>,
}

impl RSAPublicKey {
    /// Create a public key from DER (SubjectPublicKeyInfo or PKCS#1).
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let pk = RsaPublicKey::from_public_key_der(der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(der))
            .map_err(|_| JWEError::InvalidPublicKey)?;
        Self::new(pk)
    }

    /// Create a public key from PEM (SubjectPublicKeyInfo or PKCS#1).
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let pk = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_| JWEError::InvalidPublicKey)?;
        Self::new(pk)
    }

    fn new(pk: RsaPublicKey) -> Result<Self, Error> {
        ensure!(pk.size() * 8 >= MIN_RSA_MODULUS_BITS, JWEError::WeakKey);
        Ok(RSAPublicKey { pk, key_id: None })
    }

    /// Export the key as DER (SubjectPublicKeyInfo).
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.pk.to_public_key_der()?.as_bytes().to_vec())
    }

    /// Export the key as PEM (SubjectPublicKeyInfo).
    pub fn to_pem(&self) -> Result<String, Error> {
        Ok(self.pk.to_public_key_pem(LineEnding::LF)?)
    }

    /// Modulus length in bytes.
    pub fn modulus_len(&self) -> usize {
        self.pk.size()
    }

    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.pk.size() * 8
    }

    /// Set the key ID.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Get the key ID.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Encrypt a payload into a JWE token.
    pub fn encrypt(
        &self,
        algorithm: KeyManagementAlgorithm,
        payload: &[u8],
    ) -> Result<String, Error> {
        self.encrypt_with_options(algorithm, payload, &EncryptionOptions::default())
    }

    /// Encrypt a payload into a JWE token with options.
    pub fn encrypt_with_options(
        &self,
        algorithm: KeyManagementAlgorithm,
        payload: &[u8],
        options: &EncryptionOptions,
    ) -> Result<String, Error> {
        let content_encryption = options.content_encryption;
        let mut header = JWEHeader::new(algorithm.alg_name(), content_encryption.alg_name());
        if let Some(key_id) = options.key_id.as_ref().or(self.key_id.as_ref()) {
            header.key_id = Some(key_id.clone());
        }
        if let Some(cty) = &options.content_type {
            header.content_type = Some(cty.clone());
        }

        let encrypter = RSAEncrypter::new(algorithm, self);
        JWEToken::build(&header, payload, content_encryption, |cek| {
            encrypter.encrypt(cek.as_bytes())
        })
    }
}

/// RSA private key handle.
///
/// The handle is owned by the caller and only borrowed by [`RSADecrypter`].
/// It cannot be cloned, and its `Debug` output never includes key material.
///
/// With the `optimal` backend, the key is also loaded into BoringSSL, whose
/// constant-time private operation handles RSA1_5 and RSA-OAEP. RSA-OAEP-256
/// always uses the `rsa` crate, as BoringSSL's RSA API doesn't expose the
/// OAEP hash.
pub struct RSAKeyPair {
    sk: RsaPrivateKey,
    #[cfg(all(
        feature = "optimal",
        not(feature = "pure-rust"),
        not(any(target_arch = "wasm32", target_arch = "wasm64"))
    ))]
    boring_sk: Rsa<Private>,
    key_id: Option<String>,
}

impl std::fmt::Debug for RSAKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RSAKeyPair")
            .field("key_id", &self.key_id)
            .field("modulus_bits", &self.modulus_bits())
            .finish_non_exhaustive()
    }
}

impl RSAKeyPair {
    /// Load a private key from DER (PKCS#1 or PKCS#8).
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let sk = RsaPrivateKey::from_pkcs1_der(der)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(der))
            .map_err(|_| JWEError::InvalidKeyPair)?;
        Self::new(sk)
    }

    /// Load a private key from PEM (PKCS#1 or PKCS#8).
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let sk = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|_| JWEError::InvalidKeyPair)?;
        Self::new(sk)
    }

    /// Generate a new key pair.
    pub fn generate(modulus_bits: usize) -> Result<Self, Error> {
        match modulus_bits {
            2048 | 3072 | 4096 => {}
            _ => bail!(JWEError::UnsupportedRSAModulus),
        };
        let sk = RsaPrivateKey::new(&mut rand::thread_rng(), modulus_bits)?;
        debug!("generated RSA key pair ({} bits)", modulus_bits);
        Self::with_backend(sk)
    }

    fn new(sk: RsaPrivateKey) -> Result<Self, Error> {
        if sk.validate().is_err() {
            bail!(JWEError::InvalidKeyPair);
        }
        ensure!(sk.size() * 8 >= MIN_RSA_MODULUS_BITS, JWEError::WeakKey);
        debug!("loaded RSA private key ({} bits)", sk.size() * 8);
        Self::with_backend(sk)
    }

    #[cfg(all(
        feature = "optimal",
        not(feature = "pure-rust"),
        not(any(target_arch = "wasm32", target_arch = "wasm64"))
    ))]
    fn with_backend(sk: RsaPrivateKey) -> Result<Self, Error> {
        let der = sk
            .to_pkcs1_der()
            .map_err(|_| JWEError::InvalidKeyPair)?;
        let boring_sk = Rsa::<Private>::private_key_from_der(der.as_bytes())?;
        if !boring_sk.check_key()? {
            bail!(JWEError::InvalidKeyPair);
        }
        Ok(RSAKeyPair {
            sk,
            boring_sk,
            key_id: None,
        })
    }

    #[cfg(not(all(
        feature = "optimal",
        not(feature = "pure-rust"),
        not(any(target_arch = "wasm32", target_arch = "wasm64"))
    )))]
    fn with_backend(sk: RsaPrivateKey) -> Result<Self, Error> {
        Ok(RSAKeyPair { sk, key_id: None })
    }

    /// Raw private-key decryption and unpadding.
    ///
    /// The error carries no information: every failure is the same `()`.
    #[cfg(all(
        feature = "optimal",
        not(feature = "pure-rust"),
        not(any(target_arch = "wasm32", target_arch = "wasm64"))
    ))]
    fn private_decrypt(&self, padding: RSAPadding, cipher_text: &[u8]) -> Result<Vec<u8>, ()> {
        let padding = match padding {
            RSAPadding::Pkcs1v15 => Padding::PKCS1,
            RSAPadding::Oaep(super::key_management::OAEPHash::Sha1) => Padding::PKCS1_OAEP,
            RSAPadding::Oaep(super::key_management::OAEPHash::Sha256) => {
                return self.rust_private_decrypt(padding, cipher_text)
            }
        };
        let mut plain_text = vec![0u8; self.boring_sk.size() as usize];
        let plain_text_len = self
            .boring_sk
            .private_decrypt(cipher_text, &mut plain_text, padding)
            .map_err(|_| ())?;
        plain_text.truncate(plain_text_len);
        Ok(plain_text)
    }

    #[cfg(not(all(
        feature = "optimal",
        not(feature = "pure-rust"),
        not(any(target_arch = "wasm32", target_arch = "wasm64"))
    )))]
    fn private_decrypt(&self, padding: RSAPadding, cipher_text: &[u8]) -> Result<Vec<u8>, ()> {
        self.rust_private_decrypt(padding, cipher_text)
    }

    // Not constant-time (RUSTSEC-2023-0071); blinding only reduces the leak.
    fn rust_private_decrypt(&self, padding: RSAPadding, cipher_text: &[u8]) -> Result<Vec<u8>, ()> {
        let sk = &self.sk;
        let mut rng = rand::thread_rng();
        match padding {
            RSAPadding::Pkcs1v15 => sk.decrypt_blinded(&mut rng, Pkcs1v15Encrypt, cipher_text),
            RSAPadding::Oaep(hash) => sk.decrypt_blinded(&mut rng, hash.oaep(), cipher_text),
        }
        .map_err(|_| ())
    }

    /// Modulus length in bytes.
    pub fn modulus_len(&self) -> usize {
        self.sk.size()
    }

    /// Modulus size in bits.
    pub fn modulus_bits(&self) -> usize {
        self.sk.size() * 8
    }

    /// Get the matching public key.
    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey {
            pk: self.sk.to_public_key(),
            key_id: self.key_id.clone(),
        }
    }

    /// Set the key ID.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Get the key ID.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Decrypt a JWE token whose key was wrapped with `algorithm`, and return
    /// the payload.
    pub fn decrypt_token(
        &self,
        algorithm: KeyManagementAlgorithm,
        token: &str,
        options: Option<DecryptionOptions>,
    ) -> Result<Vec<u8>, Error> {
        let decrypter = RSADecrypter::new(algorithm, self);
        JWEToken::decrypt(
            algorithm.alg_name(),
            token,
            options,
            |_header, encrypted_key| decrypter.decrypt(encrypted_key).map_err(Into::into),
        )
    }
}

/// Unwraps content encryption keys with one algorithm and one private key.
///
/// Stateless: every call to [`RSADecrypter::decrypt`] is independent.
#[derive(Debug, Clone, Copy)]
pub struct RSADecrypter<'a> {
    algorithm: KeyManagementAlgorithm,
    key: &'a RSAKeyPair,
}

impl<'a> RSADecrypter<'a> {
    pub fn new(algorithm: KeyManagementAlgorithm, key: &'a RSAKeyPair) -> Self {
        RSADecrypter { algorithm, key }
    }

    pub fn algorithm(&self) -> KeyManagementAlgorithm {
        self.algorithm
    }

    /// Recover the key wrapped in `cipher_text`.
    ///
    /// Fails with `CipherTextLengthNotSatisfied` without touching the private
    /// key if the length is not the modulus length. Every other failure,
    /// including an empty recovered key, is `DecryptingFailed` with the same
    /// description.
    pub fn decrypt(&self, cipher_text: &[u8]) -> Result<CEK, RSAError> {
        if !cipher_text_length_satisfied(self.key.modulus_len(), cipher_text) {
            trace!(
                "{}: cipher text is {} bytes, expected {}",
                self.algorithm,
                cipher_text.len(),
                self.key.modulus_len()
            );
            return Err(RSAError::CipherTextLengthNotSatisfied);
        }

        let plain_text = self
            .key
            .private_decrypt(self.algorithm.padding(), cipher_text)
            .map_err(|_| RSAError::decrypting_failed())?;

        let cek = CEK::new(plain_text);
        if cek.is_empty() {
            return Err(RSAError::decrypting_failed());
        }
        Ok(cek)
    }
}

/// Wraps content encryption keys for a public key.
#[derive(Debug, Clone, Copy)]
pub struct RSAEncrypter<'a> {
    algorithm: KeyManagementAlgorithm,
    key: &'a RSAPublicKey,
}

impl<'a> RSAEncrypter<'a> {
    pub fn new(algorithm: KeyManagementAlgorithm, key: &'a RSAPublicKey) -> Self {
        RSAEncrypter { algorithm, key }
    }

    pub fn algorithm(&self) -> KeyManagementAlgorithm {
        self.algorithm
    }

    /// Wrap `plain_text`, which must be non-empty and fit the padding.
    pub fn encrypt(&self, plain_text: &[u8]) -> Result<Vec<u8>, Error> {
        let padding = self.algorithm.padding();
        let max_len = padding.max_plain_text_length(self.key.modulus_len());
        ensure!(
            !plain_text.is_empty() && plain_text.len() <= max_len,
            JWEError::PlainTextLengthNotSatisfied
        );

        let pk = &self.key.pk;
        let mut rng = rand::thread_rng();
        let cipher_text = match padding {
            RSAPadding::Pkcs1v15 => pk.encrypt(&mut rng, Pkcs1v15Encrypt, plain_text),
            RSAPadding::Oaep(hash) => pk.encrypt(&mut rng, hash.oaep(), plain_text),
        }
        .map_err(|_| JWEError::KeyWrapFailed)?;

        Ok(cipher_text)
    }
}
