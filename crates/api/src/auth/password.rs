//! Argon2id password hashing and verification.
//!
//! Hashes are stored in the participant worksheet's `PasswordHash` column as
//! PHC strings, so the algorithm parameters and salt travel with the hash.
//! Cells written by the previous portal hold werkzeug strings of the form
//! `pbkdf2:sha256:<iterations>$<salt>$<hex>`; those still verify, and the next
//! reset or password change replaces them with Argon2id. Werkzeug `scrypt:`
//! hashes are not supported and always fail to verify.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const WERKZEUG_PBKDF2_SHA256: &str = "pbkdf2:sha256";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error(transparent)]
    Phc(#[from] argon2::password_hash::Error),

    #[error("unsupported password hash method: {0}")]
    Unsupported(String),

    #[error("malformed legacy password hash")]
    Malformed,
}

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
/// A cell that is neither a PHC string nor a werkzeug PBKDF2-SHA256 string
/// is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let hash = hash.trim();
    if !hash.starts_with('$') {
        return verify_werkzeug(password, hash);
    }
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// [`verify_password`] that treats an unreadable stored hash as a mismatch.
pub fn password_matches(password: &str, hash: &str) -> bool {
    match verify_password(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        }
    }
}

/// `method$salt$hex` as written by werkzeug's `generate_password_hash`.
fn verify_werkzeug(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let mut parts = hash.splitn(3, '$');
    let (Some(method), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordError::Malformed);
    };

    let iterations = match method.rsplit_once(':') {
        Some((WERKZEUG_PBKDF2_SHA256, iterations)) => iterations
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(PasswordError::Malformed)?,
        _ => return Err(PasswordError::Unsupported(method.to_string())),
    };
    let expected = hex::decode(expected).map_err(|_| PasswordError::Malformed)?;

    let derived = pbkdf2_sha256(password.as_bytes(), salt.as_bytes(), iterations)?;
    Ok(constant_time_eq(&derived, &expected))
}

/// Single-block PBKDF2-HMAC-SHA256; the derived key is one digest long.
fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> Result<Vec<u8>, PasswordError> {
    let prf = HmacSha256::new_from_slice(password).map_err(|_| PasswordError::Malformed)?;

    let mut mac = prf.clone();
    mac.update(salt);
    mac.update(&1u32.to_be_bytes());
    let mut block = mac.finalize().into_bytes();
    let mut derived = block.to_vec();

    for _ in 1..iterations {
        let mut mac = prf.clone();
        mac.update(&block);
        block = mac.finalize().into_bytes();
        derived.iter_mut().zip(block.iter()).for_each(|(d, b)| *d ^= b);
    }
    Ok(derived)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const WERKZEUG_HASH: &str = "pbkdf2:sha256:1000$Xq3pLm9vTz$\
        5d8a79c15e4e89abac8e1de361c24dc2917ca1dd5b3fb0e4275670c45304f46e";

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn garbage_hash_fails_closed() {
        assert!(verify_password("secret", "not-a-hash").is_err());
        assert!(!password_matches("secret", "not-a-hash"));
    }

    #[test]
    fn hash_cell_whitespace_is_ignored() {
        let hash = hash_password("secret1").unwrap();
        assert!(password_matches("secret1", &format!(" {hash}\n")));
    }

    #[test]
    fn werkzeug_pbkdf2_hash_verifies() {
        assert!(verify_password("legacy-pass", WERKZEUG_HASH).unwrap());
        assert!(!verify_password("legacy-pasS", WERKZEUG_HASH).unwrap());
        assert!(password_matches("legacy-pass", &format!("{WERKZEUG_HASH}\n")));
    }

    #[test]
    fn werkzeug_scrypt_hash_fails_closed() {
        let scrypt = "scrypt:32768:8:1$salt$abcdef";
        assert_matches!(
            verify_password("legacy-pass", scrypt),
            Err(PasswordError::Unsupported(method)) if method == "scrypt:32768:8:1"
        );
        assert!(!password_matches("legacy-pass", scrypt));
    }

    #[test]
    fn malformed_werkzeug_hash_fails_closed() {
        for cell in [
            "pbkdf2:sha256:0$Xq3pLm9vTz$5d8a",
            "pbkdf2:sha256:many$Xq3pLm9vTz$5d8a",
            "pbkdf2:sha256:1000$Xq3pLm9vTz$not-hex",
            "pbkdf2:sha256:1000$Xq3pLm9vTz",
        ] {
            assert_matches!(verify_password("legacy-pass", cell), Err(PasswordError::Malformed));
        }
    }
}
