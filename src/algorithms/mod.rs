pub mod content;
pub mod key_management;
pub mod rsa_kw;

pub use self::content::{ContentEncryption, CEK};
pub use self::key_management::{KeyManagementAlgorithm, OAEPHash, RSAPadding};
pub use self::rsa_kw::{
    cipher_text_length_satisfied, RSADecrypter, RSAEncrypter, RSAKeyPair, RSAPublicKey,
};
