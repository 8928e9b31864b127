//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use common::auth::{Claims, read_pem_from_env};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: Option<String>,
}

/// Verifies access tokens issued by the auth service
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Load the public key from `JWT_PUBLIC_KEY` (PEM text or a file path)
    pub fn from_env() -> anyhow::Result<Self> {
        let public_key = read_pem_from_env("JWT_PUBLIC_KEY")?;
        Self::from_public_pem(&public_key)
    }

    pub fn from_public_pem(public_key: &str) -> anyhow::Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
    }
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(token).map_err(|e| {
        warn!("Rejected token: {}", e);
        ApiError::Unauthorized
    })?;

    if let Some(revocations) = &state.revocations {
        let revoked = revocations.is_revoked(&claims.jti).await.map_err(|e| {
            error!("Failed to check token revocation: {}", e);
            ApiError::InternalServerError
        })?;
        if revoked {
            warn!("Rejected revoked token {}", claims.jti);
            return Err(ApiError::Unauthorized);
        }
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(req).await)
}
