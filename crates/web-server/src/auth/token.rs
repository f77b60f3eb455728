use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by an issued access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: Uuid,
    pub email: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Access token expired")]
    Expired,
    #[error("Invalid access token")]
    Invalid,
}

/// Issues an HS256 access token for the given user.
pub fn issue(
    user_id: Uuid,
    email: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a token's signature and expiry and returns its claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn issued_tokens_verify_and_carry_the_user() {
        let user_id = Uuid::new_v4();
        let token = issue(user_id, "admin@shelter.org", SECRET, 24).expect("token issues");

        let claims = verify(&token, SECRET).expect("token verifies");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "admin@shelter.org");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn the_wrong_secret_is_rejected() {
        let token = issue(Uuid::new_v4(), "admin@shelter.org", SECRET, 24).expect("token issues");
        assert_eq!(verify(&token, "other-secret"), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(verify("not-a-token", SECRET), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        // Forge a token whose expiry is well past the default leeway.
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "admin@shelter.org".to_string(),
            iat: (now - Duration::hours(3)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token encodes");

        assert_eq!(verify(&token, SECRET), Err(TokenError::Expired));
    }
}
