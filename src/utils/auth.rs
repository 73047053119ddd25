use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Claims the identity provider places in its access tokens. `sub` carries
/// the caller's auth id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

/// Verifies bearer tokens against the secret shared with the identity
/// provider. The decoding key is built once at startup; per-request
/// verification never reads the environment.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))
    }

    /// Pulls the bearer token from the Authorization header and returns the
    /// caller's auth id.
    pub fn authenticate(&self, req: &HttpRequest) -> Result<Uuid, AppError> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|auth| auth.to_str().ok())
            .and_then(|auth| auth.split_whitespace().nth(1))
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        Ok(self.verify(token)?.sub)
    }
}
