//! Signed, time-limited bearer tokens (HS256). The same signer that issues
//! tokens verifies them; issuance and the auth gate must share one secret.

use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Identity claims embedded in every token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Record id of the user or center account.
    pub sub: i64,
    pub email: String,
    /// "user" or "center".
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        TokenSigner {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a token for the identity, expiring after the configured TTL.
    /// There is no refresh path; re-authentication is the only recovery.
    pub fn issue(&self, sub: i64, email: &str, role: &str) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub,
            email: email.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let signer = TokenSigner::new("test-secret", 3600);
        let token = signer.issue(7, "asha@example.com", "user").unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "asha@example.com");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let signer = TokenSigner::new("test-secret", 3600);
        let other = TokenSigner::new("other-secret", 3600);
        let token = signer.issue(7, "asha@example.com", "user").unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 3600);
        let past = Utc::now().timestamp() - 7200;
        let claims = Claims {
            sub: 7,
            email: "asha@example.com".into(),
            role: "user".into(),
            iat: past,
            exp: past + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let signer = TokenSigner::new("test-secret", 3600);
        let mut token = signer.issue(7, "asha@example.com", "user").unwrap();
        token.push('x');
        assert!(signer.verify(&token).is_err());
    }
}
