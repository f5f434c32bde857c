//! Argon2id password hashing.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// Hashes and verifies passwords as Argon2id PHC strings.
///
/// If a pepper is configured it is prepended to the password before hashing
/// and verification. Changing the pepper invalidates every stored digest.
///
/// A decoy digest of a random, discarded password is kept so that logins for
/// unknown emails spend the same Argon2 work as a wrong password.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    pepper: Option<String>,
    decoy: String,
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", &self.params)
            .field("pepper", &self.pepper.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialHasher {
    /// `memory_kib` and `iterations` feed Argon2id directly; parallelism is 1.
    pub fn new(
        memory_kib: u32,
        iterations: u32,
        pepper: Option<String>,
    ) -> Result<Self, anyhow::Error> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| anyhow::anyhow!("argon2 params error: {e}"))?;
        let mut hasher = Self {
            params,
            pepper,
            decoy: String::new(),
        };
        hasher.decoy = hasher.hash(SaltString::generate(&mut OsRng).as_str())?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &str) -> String {
        match &self.pepper {
            Some(p) => format!("{p}{password}"),
            None => password.to_owned(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, anyhow::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hash error: {e}"))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored digest is malformed.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, anyhow::Error> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| anyhow::anyhow!("invalid hash format: {e}"))?;
        match self
            .argon2()
            .verify_password(self.peppered(password).as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!("verify error: {e}")),
        }
    }

    /// Verify `password` against the decoy digest and discard the outcome.
    pub fn verify_decoy(&self, password: &str) {
        let _ = self.verify(password, &self.decoy);
    }
}
