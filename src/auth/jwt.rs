use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Bearer-token claims. Sign-up, login, and token minting live in the
/// identity service; this API only verifies what arrives in the
/// Authorization header.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

/// Mint an access token for a user. Used by ops tooling and tests; the
/// production issuer is the identity service sharing the same secret.
pub fn issue_token(user_id: Uuid, ttl_secs: i64, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to issue token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".into(),
            host: "127.0.0.1".into(),
            port: 8080,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            flow_ttl_secs: 1800,
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = issue_token(user_id, 900, &config).unwrap();
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let token = issue_token(Uuid::new_v4(), -3600, &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_token(Uuid::new_v4(), 900, &config).unwrap();

        let mut other = test_config();
        other.jwt_secret = "different-secret".into();
        assert!(verify_token(&token, &other).is_err());
    }
}
