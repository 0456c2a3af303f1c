//! Salted password digests.
//!
//! Plain passwords only ever live inside [`Zeroizing`] buffers; the stored
//! form is a random hex salt plus the SHA-256 digest of salt and password.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const SALT_LEN: usize = 16;

/// Stored password credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hash `password` with a freshly generated salt.
    pub fn generate(password: &str) -> Self {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt = hex::encode(salt);
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    /// Rebuild a credential from previously stored parts.
    pub fn from_parts(salt: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            digest: digest.into(),
        }
    }

    /// Whether `password` produces this digest.
    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.digest
    }

    /// Hex-encoded salt.
    pub fn salt(&self) -> &str {
        self.salt.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("salt", &self.salt)
            .field("digest", &"<redacted>")
            .finish()
    }
}

fn digest(salt: &str, password: &str) -> String {
    let material = Zeroizing::new(format!("{salt}{password}"));
    hex::encode(Sha256::digest(material.as_bytes()))
}
