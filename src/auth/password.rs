use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Symbols accepted by the password policy.
const POLICY_SYMBOLS: &str = "@$!%*?&";

pub const POLICY_MESSAGE: &str = "Password must be at least 8 characters and include an \
     uppercase letter, a lowercase letter, a digit and a special character (@$!%*?&)";

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Fixed strength policy: length, upper, lower, digit, and one allowed symbol.
pub fn meets_policy(password: &str) -> bool {
    password.len() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| POLICY_SYMBOLS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn policy_accepts_conforming_password() {
        assert!(meets_policy("Abcdef1!"));
        assert!(meets_policy("NewPass1?"));
    }

    #[test]
    fn policy_rejects_each_missing_rule() {
        assert!(!meets_policy("Ab1!xyz")); // too short
        assert!(!meets_policy("abcdef1!")); // no uppercase
        assert!(!meets_policy("ABCDEF1!")); // no lowercase
        assert!(!meets_policy("Abcdefg!")); // no digit
        assert!(!meets_policy("Abcdefg1")); // no symbol
        assert!(!meets_policy("Abcdef1#")); // symbol outside the allowed set
    }
}
