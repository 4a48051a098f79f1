//! JWT service for signing and validating bearer tokens
//!
//! Tokens are RS256. The private key stays with this service; the playlist
//! API only ever receives the public key.

use anyhow::Result;
use common::token::{Claims, TokenType, load_pem_from_env};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Private key for signing tokens
    pub private_key: String,
    /// Public key for verifying tokens
    pub public_key: String,
    /// Access token expiration time in seconds
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    /// Read `JWT_PRIVATE_KEY` and `JWT_PUBLIC_KEY` (inline PEM or path to one)
    pub fn from_env(access_token_expiry: u64, refresh_token_expiry: u64) -> Result<Self> {
        Ok(JwtConfig {
            private_key: load_pem_from_env("JWT_PRIVATE_KEY")?,
            public_key: load_pem_from_env("JWT_PUBLIC_KEY")?,
            access_token_expiry,
            refresh_token_expiry,
        })
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
    refresh_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key.as_bytes())?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;

        Ok(JwtService {
            encoding_key,
            decoding_key,
            validation,
            access_token_expiry: config.access_token_expiry,
            refresh_token_expiry: config.refresh_token_expiry,
        })
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        self.sign(Claims::new(
            user_id,
            TokenType::Access,
            self.access_token_expiry,
        ))
    }

    /// Generate a refresh token for a user
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        self.sign(Claims::new(
            user_id,
            TokenType::Refresh,
            self.refresh_token_expiry,
        ))
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }

    fn sign(&self, claims: Claims) -> Result<String> {
        Ok(encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.encoding_key,
        )?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_service() -> JwtService {
        JwtService::new(JwtConfig {
            private_key: include_str!("../../../keys/dev/jwt_private.pem").to_string(),
            public_key: include_str!("../../../keys/dev/jwt_public.pem").to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604_800,
        })
        .unwrap()
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_lifetime() {
        let service = test_service();
        let token = service.generate_refresh_token(Uuid::new_v4()).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 604_800);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let mut token = service.generate_access_token(Uuid::new_v4()).unwrap();
        token.push('x');

        assert!(service.validate_token(&token).is_err());
        assert!(service.validate_token("garbage").is_err());
    }
}
