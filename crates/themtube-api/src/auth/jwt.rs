//! HMAC-signed access tokens
//!
//! Tokens carry the user's email as `sub`, plus id, role and token type.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::str::FromStr;
use themtube_core::constants::BEARER_TOKEN_TYPE;
use themtube_core::models::User;
use themtube_core::AppError;

use crate::auth::models::Claims;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    expire_days: i64,
}

impl JwtService {
    /// Create a service for a shared secret. Only HS256/HS384/HS512 are accepted.
    pub fn new(secret: &str, algorithm: &str, expire_days: i64) -> Result<Self, AppError> {
        let algorithm = Algorithm::from_str(algorithm).map_err(|_| {
            AppError::InvalidInput(format!("Unsupported JWT algorithm: {}", algorithm))
        })?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AppError::InvalidInput(format!(
                "JWT algorithm {:?} requires a key pair; use HS256, HS384 or HS512",
                algorithm
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            validation: Validation::new(algorithm),
            expire_days,
        })
    }

    /// Issue a bearer token for `user`.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            id: user.id,
            role: user.role,
            token_type: BEARER_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.expire_days)).timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode token: {}", e)))
    }

    /// Decode and validate a token. Signature, expiry and shape failures all map to 401.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                AppError::Unauthorized("Could not validate credentials".to_string())
            })
    }
}
