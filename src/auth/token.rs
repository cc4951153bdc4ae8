use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

/// Bytes of entropy in a password-reset token (rendered as 64 hex chars).
const RESET_TOKEN_BYTES: usize = 32;

/// Random 6-digit verification code, 100000..=999999.
pub fn generate_verification_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Random high-entropy reset token. The plaintext goes into the email only;
/// the store keeps just the SHA-256 hash.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hashed-at-rest form of a reset token. Applied both when storing at
/// request time and when looking up at completion time.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_code_is_six_digits_in_range() {
        for _ in 0..100 {
            let code = generate_verification_code();
            assert_eq!(code.len(), 6);
            let n: u32 = code.parse().expect("numeric code");
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn reset_token_is_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }

    #[test]
    fn token_hash_is_deterministic_and_token_specific() {
        let token = generate_reset_token();
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
        assert_ne!(hash_reset_token(&token), hash_reset_token("other-token"));
    }

    #[test]
    fn token_hash_matches_known_sha256() {
        // SHA-256("abc")
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
