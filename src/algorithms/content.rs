//! Content encryption for JWE payloads (A128GCM, A256GCM).
//!
//! The content encryption key is either freshly generated (sender) or recovered
//! by a key management algorithm (recipient).

#[cfg(any(feature = "pure-rust", target_arch = "wasm32", target_arch = "wasm64"))]
use superboring as boring;

use boring::symm::{Cipher, Crypter, Mode};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::*;

const GCM_IV_SIZE: usize = 12;
const GCM_TAG_SIZE: usize = 16;

/// Content encryption algorithm ("enc" header parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentEncryption {
    /// AES-256-GCM
    #[default]
    A256GCM,
    /// AES-128-GCM
    A128GCM,
}

impl ContentEncryption {
    pub fn alg_name(&self) -> &'static str {
        match self {
            ContentEncryption::A256GCM => "A256GCM",
            ContentEncryption::A128GCM => "A128GCM",
        }
    }

    pub fn from_alg_name(name: &str) -> Result<Self, Error> {
        match name {
            "A256GCM" => Ok(ContentEncryption::A256GCM),
            "A128GCM" => Ok(ContentEncryption::A128GCM),
            _ => bail!(JWEError::UnsupportedContentEncryption(name.to_string())),
        }
    }

    /// Required CEK size in bytes.
    pub fn key_size(&self) -> usize {
        match self {
            ContentEncryption::A256GCM => 32,
            ContentEncryption::A128GCM => 16,
        }
    }

    pub fn iv_size(&self) -> usize {
        GCM_IV_SIZE
    }

    pub fn tag_size(&self) -> usize {
        GCM_TAG_SIZE
    }

    /// A fresh random CEK of the right size for this algorithm.
    pub fn generate_cek(&self) -> CEK {
        let mut key = vec![0u8; self.key_size()];
        rand::thread_rng().fill_bytes(&mut key);
        CEK::new(key)
    }

    pub fn generate_iv(&self) -> Vec<u8> {
        let mut iv = vec![0u8; self.iv_size()];
        rand::thread_rng().fill_bytes(&mut iv);
        iv
    }

    fn cipher(&self) -> Cipher {
        match self {
            ContentEncryption::A256GCM => Cipher::aes_256_gcm(),
            ContentEncryption::A128GCM => Cipher::aes_128_gcm(),
        }
    }

    /// Encrypt a payload, returning `(ciphertext, tag)`.
    pub fn encrypt(
        &self,
        cek: &CEK,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>), Error> {
        ensure!(cek.len() == self.key_size(), JWEError::InvalidEncryptionKey);
        ensure!(iv.len() == self.iv_size(), JWEError::InvalidIV);

        let cipher = self.cipher();
        let mut crypter = Crypter::new(cipher, Mode::Encrypt, cek.as_bytes(), Some(iv))?;
        crypter.aad_update(aad)?;

        let mut ciphertext = vec![0u8; plaintext.len() + cipher.block_size()];
        let mut count = crypter.update(plaintext, &mut ciphertext)?;
        count += crypter.finalize(&mut ciphertext[count..])?;
        ciphertext.truncate(count);

        let mut tag = vec![0u8; self.tag_size()];
        crypter.get_tag(&mut tag)?;

        Ok((ciphertext, tag))
    }

    /// Decrypt and authenticate a payload.
    ///
    /// Any authentication failure is reported as `JWEError::DecryptionFailed`,
    /// including the one caused by a substituted CEK after a failed key unwrap.
    pub fn decrypt(
        &self,
        cek: &CEK,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, Error> {
        ensure!(cek.len() == self.key_size(), JWEError::InvalidEncryptionKey);
        ensure!(iv.len() == self.iv_size(), JWEError::InvalidIV);
        ensure!(tag.len() == self.tag_size(), JWEError::InvalidJWEAuthTag);

        let cipher = self.cipher();
        let mut crypter = Crypter::new(cipher, Mode::Decrypt, cek.as_bytes(), Some(iv))?;
        crypter.aad_update(aad)?;
        crypter.set_tag(tag)?;

        let mut plaintext = vec![0u8; ciphertext.len() + cipher.block_size()];
        let mut count = crypter
            .update(ciphertext, &mut plaintext)
            .map_err(|_| JWEError::DecryptionFailed)?;
        count += crypter
            .finalize(&mut plaintext[count..])
            .map_err(|_| JWEError::DecryptionFailed)?;
        plaintext.truncate(count);

        Ok(plaintext)
    }
}

/// A content encryption key, zeroized on drop.
///
/// Intentionally not `Clone`, and its `Debug` output never includes the key.
pub struct CEK {
    key: Vec<u8>,
}

impl CEK {
    pub fn new(key: Vec<u8>) -> Self {
        CEK { key }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for CEK {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CEK")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}

impl Drop for CEK {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl AsRef<[u8]> for CEK {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}
