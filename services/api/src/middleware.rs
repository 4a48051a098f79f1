//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use common::token::{Claims, TokenType, load_pem_from_env};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use tracing::warn;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Verifies RS256 tokens issued by the identity service
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Build a verifier from `JWT_PUBLIC_KEY` (inline PEM or path to one)
    pub fn from_env() -> anyhow::Result<Self> {
        let public_key = load_pem_from_env("JWT_PUBLIC_KEY")?;
        Ok(Self::from_rsa_pem(&public_key)?)
    }

    /// Build a verifier from a PEM-encoded RSA public key
    pub fn from_rsa_pem(public_key: &str) -> jsonwebtoken::errors::Result<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate the signature and expiry and return the claims
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid access token, and
/// otherwise makes the caller available to handlers as `Extension<AuthUser>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(bearer.token()).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    if claims.token_type != TokenType::Access {
        warn!("Rejected non-access token for user {}", claims.sub);
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser { id: claims.sub });

    Ok(next.run(req).await)
}
