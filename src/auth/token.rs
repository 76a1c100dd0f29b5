//! Signed session tokens.
//!
//! A token is `header.payload.signature`, each segment base64url without padding. The
//! signature is HMAC-SHA256 over `header.payload`. Nothing is stored server side, so a
//! token stays valid until `exp` regardless of later account changes.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use super::constant_time_compare;

type HmacSha256 = Hmac<Sha256>;

/// Fixed token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    typ: String,
    alg: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    user_id: i64,
    username: String,
    exp: i64,
}

/// The identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub username: String,
    pub expires_at: i64,
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> String {
        self.issue_at(user_id, username, Utc::now().timestamp())
    }

    pub fn issue_at(&self, user_id: i64, username: &str, now: i64) -> String {
        let header = TokenHeader {
            typ: "JWT".to_string(),
            alg: "HS256".to_string(),
        };
        let payload = TokenPayload {
            user_id,
            username: username.to_string(),
            exp: now + TOKEN_TTL_SECS,
        };

        // Serializing these plain structs cannot fail.
        let header_part = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap_or_default());
        let payload_part =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap_or_default());
        let signature = self.sign(&header_part, &payload_part);

        format!("{}.{}.{}", header_part, payload_part, signature)
    }

    pub fn verify(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenIdentity, TokenError> {
        let parts: Vec<&str> = token.split('.').collect();
        let [header_part, payload_part, signature] = parts.as_slice() else {
            return Err(TokenError::Malformed);
        };

        let expected = self.sign(header_part, payload_part);
        if !constant_time_compare(signature, &expected) {
            return Err(TokenError::InvalidSignature);
        }

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| TokenError::Malformed)?;
        let payload: TokenPayload =
            serde_json::from_slice(&payload_bytes).map_err(|_| TokenError::Malformed)?;

        if payload.exp < now {
            return Err(TokenError::Expired);
        }

        Ok(TokenIdentity {
            user_id: payload.user_id,
            username: payload.username,
            expires_at: payload.exp,
        })
    }

    fn sign(&self, header_part: &str, payload_part: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length");
        mac.update(header_part.as_bytes());
        mac.update(b".");
        mac.update(payload_part.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret-that-is-long-enough-for-hs256")
    }

    #[test]
    fn test_issue_then_verify() {
        let token = codec().issue_at(7, "editor", NOW);
        let identity = codec().verify_at(&token, NOW).unwrap();
        assert_eq!(identity.user_id, 7);
        assert_eq!(identity.username, "editor");
        assert_eq!(identity.expires_at, NOW + TOKEN_TTL_SECS);
    }

    #[test]
    fn test_token_shape() {
        let token = codec().issue_at(1, "admin", NOW);
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            assert!(!part.contains('='));
            assert!(!part.contains('+'));
            assert!(!part.contains('/'));
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let token = codec().issue_at(1, "admin", NOW);
        let exp = NOW + TOKEN_TTL_SECS;
        assert!(codec().verify_at(&token, exp).is_ok());
        assert_eq!(
            codec().verify_at(&token, exp + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_issue_uses_wall_clock() {
        let token = codec().issue(3, "admin");
        assert!(codec().verify(&token).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = codec().issue_at(1, "admin", NOW);
        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&TokenPayload {
                user_id: 2,
                username: "admin".into(),
                exp: NOW + TOKEN_TTL_SECS,
            })
            .unwrap(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(
            codec().verify_at(&forged, NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_every_byte_of_payload_and_signature_is_covered() {
        let token = codec().issue_at(1, "admin", NOW);
        let payload_start = token.find('.').unwrap() + 1;
        let bytes = token.as_bytes();
        for i in payload_start..bytes.len() {
            if bytes[i] == b'.' {
                continue;
            }
            let mut tampered = bytes.to_vec();
            tampered[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            assert_eq!(
                codec().verify_at(&tampered, NOW),
                Err(TokenError::InvalidSignature),
                "byte {} not covered",
                i
            );
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec().issue_at(1, "admin", NOW);
        let other = TokenCodec::new("another-secret");
        assert_eq!(
            other.verify_at(&token, NOW),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(codec().verify_at("", NOW), Err(TokenError::Malformed));
        assert_eq!(codec().verify_at("a.b", NOW), Err(TokenError::Malformed));
        assert_eq!(
            codec().verify_at("a.b.c.d", NOW),
            Err(TokenError::Malformed)
        );
    }
}
