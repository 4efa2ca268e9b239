//! Password hashes derived with PBKDF2-HMAC-SHA256, stored as
//! `pbkdf2$<iterations>$<salt_hex>$<key_hex>`.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2";
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 200_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

pub fn hash_password(password: &str) -> String {
    hash_password_with(password, DEFAULT_PBKDF2_ITERATIONS)
}

pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let salt: [u8; SALT_LEN] = rand::random();
    let key = derive_key(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        hex::encode(salt),
        hex::encode(key)
    )
}

/// Check `password` against a stored hash. The iteration count is read from
/// the hash itself, so older hashes keep verifying after the default changes.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };

    let actual = derive_key(password, &salt, iterations);
    constant_time_eq(&actual, &expected)
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

/// Constant-time comparison to prevent timing attacks.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low count keeps the unit tests fast; the format is the same.
    const FAST: u32 = 1_000;

    #[test]
    fn verifies_matching_password() {
        let stored = hash_password_with("hunter22", FAST);
        assert!(verify_password("hunter22", &stored));
        assert!(!verify_password("hunter23", &stored));
    }

    #[test]
    fn default_hash_records_its_work_factor() {
        let stored = hash_password("hunter22");
        let parts: Vec<&str> = stored.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2");
        assert_eq!(parts[1], DEFAULT_PBKDF2_ITERATIONS.to_string());
        assert_eq!(parts[2].len(), SALT_LEN * 2);
        assert_eq!(parts[3].len(), KEY_LEN * 2);
        assert!(verify_password("hunter22", &stored));
    }

    #[test]
    fn key_matches_pbkdf2_for_the_stored_salt() {
        let stored = hash_password_with("hunter22", FAST);
        let parts: Vec<&str> = stored.split('$').collect();
        let salt = hex::decode(parts[2]).unwrap();
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(b"hunter22", &salt, FAST, &mut key);
        assert_eq!(parts[3], hex::encode(key));
    }

    #[test]
    fn changed_iteration_count_fails_to_verify() {
        let stored = hash_password_with("hunter22", FAST);
        let tampered = stored.replacen(&format!("${FAST}$"), &format!("${}$", FAST + 1), 1);
        assert_ne!(stored, tampered);
        assert!(!verify_password("hunter22", &tampered));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(
            hash_password_with("hunter22", FAST),
            hash_password_with("hunter22", FAST)
        );
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "nodollar"));
        assert!(!verify_password("x", "zz$abcd"));
        assert!(!verify_password("x", "pbkdf2$0$00$00"));
        assert!(!verify_password("x", "pbkdf2$many$00$00"));
        assert!(!verify_password("x", "pbkdf2$10$zz$00"));
        assert!(!verify_password("x", "pbkdf2$10$00$00$extra"));
        assert!(!verify_password("x", "bcrypt$10$00$00"));
    }
}
