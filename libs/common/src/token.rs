//! Bearer token claims shared by the identity service (which signs them) and
//! the playlist API (which only verifies them).

use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};
use uuid::Uuid;

use crate::error::KeyError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// User ID. Older clients put it under `userId` or `id`.
    #[serde(alias = "userId", alias = "id")]
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl_seconds` from now
    pub fn new(user_id: Uuid, token_type: TokenType, ttl_seconds: u64) -> Self {
        let iat = now_secs();
        Self {
            sub: user_id,
            iat,
            exp: iat + ttl_seconds,
            token_type,
        }
    }
}

/// Seconds since the Unix epoch
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Read a PEM key from the environment variable `var`.
///
/// The variable holds either the PEM text itself or a path to it. Relative
/// paths are tried against the working directory first, then the workspace
/// root (where `keys/dev` lives).
pub fn load_pem_from_env(var: &str) -> Result<String, KeyError> {
    let value = std::env::var(var).map_err(|_| KeyError::Missing(var.to_string()))?;
    load_pem(&value)
}

/// Resolve an inline PEM or a path to one
pub fn load_pem(value: &str) -> Result<String, KeyError> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push("../..");
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map(|pem| pem.trim().to_string())
        .map_err(|source| KeyError::Unreadable {
            path: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_accept_legacy_subject_names() {
        let id = Uuid::new_v4();
        for field in ["sub", "userId", "id"] {
            let raw = serde_json::json!({
                field: id,
                "iat": 1,
                "exp": 2,
                "token_type": "Access",
            });
            let claims: Claims = serde_json::from_value(raw).unwrap();
            assert_eq!(claims.sub, id);
        }
    }

    #[test]
    fn test_claims_new_sets_expiry() {
        let claims = Claims::new(Uuid::new_v4(), TokenType::Refresh, 60);
        assert_eq!(claims.exp - claims.iat, 60);
        assert_eq!(claims.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_load_pem_inline_and_from_workspace_path() {
        let inline = "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----";
        assert_eq!(load_pem(inline).unwrap(), inline);

        let from_file = load_pem("keys/dev/jwt_public.pem").unwrap();
        assert!(from_file.starts_with("-----BEGIN PUBLIC KEY-----"));

        assert!(matches!(
            load_pem("keys/dev/missing.pem"),
            Err(KeyError::Unreadable { .. })
        ));
    }
}
