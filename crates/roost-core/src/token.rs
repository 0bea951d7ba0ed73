use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Token claims: the user id, symmetrically signed. Possession of a token
/// that decodes to an id with a live session is the whole identity model.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Issue a signed token for a user id.
pub fn encode_token(auth_key: &str, u_id: u64) -> String {
    let claims = Claims {
        sub: u_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };
    // HS256 encoding with a valid key cannot fail.
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth_key.as_bytes()),
    )
    .unwrap_or_default()
}

/// Decode a token back to its user-id claim. Tampered, garbage, or expired
/// input fails closed with `None`; the caller maps that to an access error.
pub fn decode_token(auth_key: &str, token: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth_key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()
    .map(|data| data.claims.sub)
}

/// Single fast hash for stored passwords. Deliberately not a slow KDF:
/// hardening is a stated non-goal of this system.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Password-reset code: hash of the account email and the current time,
/// unique enough to act as a one-shot bearer secret for the reset flow.
pub fn make_reset_code(email: &str, now: i64) -> String {
    hex::encode(Sha256::digest(format!("{email}{now}").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let token = encode_token("secret", 42);
        assert_eq!(decode_token("secret", &token), Some("42".to_string()));
    }

    #[test]
    fn tampered_token_fails_closed() {
        let token = encode_token("secret", 42);
        let mut tampered = token.clone();
        tampered.push('x');
        assert_eq!(decode_token("secret", &tampered), None);
        assert_eq!(decode_token("other-key", &token), None);
        assert_eq!(decode_token("secret", "not even a token"), None);
    }

    #[test]
    fn password_hash_is_stable() {
        assert_eq!(hash_password("hunter22"), hash_password("hunter22"));
        assert_ne!(hash_password("hunter22"), hash_password("hunter23"));
    }
}
