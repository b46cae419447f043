//! Salted, iterated SHA-256 password credentials.
//!
//! A credential is stored as `salt:hash`. The salt is 16 random bytes in
//! lowercase hex. The hash is produced by seeding a working string with
//! `password + salt` and replacing it [`ITERATIONS`] times with the lowercase
//! hex SHA-256 digest of its UTF-8 bytes.
//!
//! This construction only exists so credentials written by earlier deployments
//! keep verifying. New code should move to argon2 once every stored credential
//! has been rehashed.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

pub const SALT_LEN: usize = 16;
pub const ITERATIONS: u32 = 100_000;

const SEPARATOR: char = ':';

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Stored credential is not in salt:hash format")]
pub struct InvalidCredentialFormat;

#[derive(Debug, thiserror::Error)]
#[error("Can't read from the system random source: {0}")]
pub struct RandomSourceError(#[from] rand::Error);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn from_password(password: &str) -> Result<Self, RandomSourceError> {
        let mut salt = [0_u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt)?;
        Ok(Self::with_salt(password, &hex::encode(salt)))
    }

    /// Deterministic for a given salt, used to reproduce stored credentials.
    pub fn with_salt(password: &str, salt: &str) -> Self {
        let digest = iterated_digest(password, salt);
        Self(format!("{}{}{}", salt, SEPARATOR, digest))
    }

    pub fn parse(stored: impl Into<String>) -> Result<Self, InvalidCredentialFormat> {
        let stored = stored.into();
        split(&stored)?;
        Ok(Self(stored))
    }

    pub fn salt(&self) -> &str {
        // invariant checked on construction
        self.0.split_once(SEPARATOR).map(|(salt, _)| salt).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Derives a fresh credential with a new random salt.
pub fn hash(password: &str) -> Result<Credential, RandomSourceError> {
    Credential::from_password(password)
}

/// Checks `password` against a stored `salt:hash` string.
///
/// A wrong password is `Ok(false)`. A stored string that isn't a credential is an
/// error, callers must not report it as a failed login.
pub fn verify(password: &str, stored: &str) -> Result<bool, InvalidCredentialFormat> {
    let (salt, original) = split(stored)?;
    let candidate = iterated_digest(password, salt);
    Ok(constant_time_eq(candidate.as_bytes(), original.as_bytes()))
}

fn split(stored: &str) -> Result<(&str, &str), InvalidCredentialFormat> {
    match stored.split_once(SEPARATOR) {
        Some((salt, hash)) if !salt.is_empty() && !hash.is_empty() => Ok((salt, hash)),
        _ => Err(InvalidCredentialFormat),
    }
}

fn iterated_digest(password: &str, salt: &str) -> String {
    let mut current = format!("{}{}", password, salt);
    for _ in 0..ITERATIONS {
        // every round hashes the hex text of the previous one, not its raw bytes
        current = hex::encode(Sha256::digest(current.as_bytes()));
    }
    current
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
