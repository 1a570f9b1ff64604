//! Salted PBKDF2-HMAC-SHA256 password hashes
//!
//! Stored as `pbkdf2-sha256$<rounds>$<salt>$<hash>`, salt and hash base64.

use rand::RngCore;
use sha2::Sha256;

use super::AuthError;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut out);
    out
}

pub fn hash_password(password: &str, rounds: u32) -> Result<String, AuthError> {
    if rounds == 0 {
        return Err(AuthError::PasswordHash("rounds must be positive".to_string()));
    }
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, rounds);
    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        rounds,
        base64::encode(salt),
        base64::encode(hash)
    ))
}

/// Hashing is CPU bound; keep it off the async workers.
pub async fn hash_password_blocking(password: String, rounds: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password, rounds))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
}

pub fn verify_password(password: &str, stored: &str) -> Result<bool, AuthError> {
    let malformed = || AuthError::PasswordHash("malformed password hash".to_string());

    let mut parts = stored.split('$');
    let (scheme, rounds, salt, hash) = match (parts.next(), parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(rounds), Some(salt), Some(hash), None) => (scheme, rounds, salt, hash),
        _ => return Err(malformed()),
    };
    if scheme != SCHEME {
        return Err(malformed());
    }
    let rounds: u32 = rounds.parse().map_err(|_| malformed())?;
    if rounds == 0 {
        return Err(malformed());
    }
    let salt = base64::decode(salt).map_err(|_| malformed())?;
    let expected = base64::decode(hash).map_err(|_| malformed())?;

    let actual = derive(password, &salt, rounds);
    Ok(constant_time_eq(&actual, &expected))
}

/// Compares every byte regardless of where the first mismatch is
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("hunter22", 1_000).unwrap();
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("hunter22", &stored).unwrap());
        assert!(!verify_password("hunter23", &stored).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password("same", 1_000).unwrap();
        let b = hash_password("same", 1_000).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("x", "plain-text").is_err());
        assert!(verify_password("x", "bcrypt$10$abc$def").is_err());
    }

    #[test]
    fn digest_comparison_checks_length_and_every_byte() {
        assert!(constant_time_eq(b"abcd", b"abcd"));
        assert!(!constant_time_eq(b"abcd", b"abce"));
        assert!(!constant_time_eq(b"xbcd", b"abcd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }

    #[test]
    fn zero_rounds_is_refused() {
        assert!(hash_password("x", 0).is_err());
    }
}
