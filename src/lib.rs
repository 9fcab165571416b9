#![forbid(unsafe_code)]

pub mod algorithms;
pub mod error;
pub mod jwe_header;
pub mod jwe_token;

#[cfg(test)]
mod test_vectors;

pub mod prelude {
    pub use crate::algorithms::*;
    pub use crate::error::{Error, JWEError, RSAError, RSA_DECRYPTION_FAILURE};
    pub use crate::jwe_header::JWEHeader;
    pub use crate::jwe_token::{DecryptionOptions, EncryptionOptions, JWEToken, JWETokenMetadata};
}
