//! Bearer tokens and password hashing.
//!
//! Tokens are `base64url(claims).base64url(HMAC-SHA256(secret, claims))` with
//! claims `{"userId", "exp"}`. Passwords are stored as Argon2id PHC strings;
//! hashing runs on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::ServerError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i32,
    exp: i64,
}

/// Issues and checks bearer tokens, hashes and checks passwords.
#[derive(Clone)]
pub struct Auth {
    secret: Vec<u8>,
    token_ttl: Duration,
    hash_params: Params,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("token_ttl", &self.token_ttl)
            .field("hash_params", &self.hash_params)
            .finish_non_exhaustive()
    }
}

fn internal(err: impl std::fmt::Display) -> ServerError {
    ServerError::Internal(err.to_string())
}

fn mac(key: &[u8]) -> Result<HmacSha256, ServerError> {
    HmacSha256::new_from_slice(key).map_err(internal)
}

async fn blocking<T, F>(work: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(internal)?
}

impl Auth {
    /// `hash_memory_kib` and `hash_passes` are the Argon2id memory and time
    /// costs; parallelism is fixed at 1.
    pub fn new(
        secret: impl Into<Vec<u8>>,
        token_ttl: Duration,
        hash_memory_kib: u32,
        hash_passes: u32,
    ) -> Result<Self, ServerError> {
        let hash_params = Params::new(hash_memory_kib, hash_passes, 1, None).map_err(internal)?;
        Ok(Self {
            secret: secret.into(),
            token_ttl,
            hash_params,
        })
    }

    fn hasher(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.hash_params.clone())
    }

    pub fn issue_token(&self, user_id: i32) -> Result<String, ServerError> {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + self.token_ttl).timestamp(),
        };
        let claims = serde_json::to_vec(&claims).map_err(internal)?;
        let claims = URL_SAFE_NO_PAD.encode(claims);

        let mut signer = mac(&self.secret)?;
        signer.update(claims.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(signer.finalize().into_bytes());

        Ok(format!("{claims}.{signature}"))
    }

    /// Return the user id carried by a valid, unexpired token.
    pub fn verify_token(&self, token: &str) -> Result<i32, ServerError> {
        let invalid = || ServerError::Unauthorized("invalid token".to_string());

        let (claims, signature) = token.split_once('.').ok_or_else(invalid)?;
        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| invalid())?;
        let mut verifier = mac(&self.secret)?;
        verifier.update(claims.as_bytes());
        verifier.verify_slice(&signature).map_err(|_| invalid())?;

        let claims = URL_SAFE_NO_PAD.decode(claims).map_err(|_| invalid())?;
        let claims: Claims = serde_json::from_slice(&claims).map_err(|_| invalid())?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(ServerError::Unauthorized("token expired".to_string()));
        }
        Ok(claims.user_id)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, ServerError> {
        let hasher = self.hasher();
        let password = password.to_owned();
        blocking(move || {
            let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes()).map_err(internal)?;
            let hash = hasher
                .hash_password(password.as_bytes(), &salt)
                .map_err(internal)?;
            Ok(hash.to_string())
        })
        .await
    }

    /// Check `password` against a stored PHC string. Malformed hashes never match.
    pub async fn verify_password(&self, password: &str, stored: &str) -> Result<bool, ServerError> {
        let hasher = self.hasher();
        let password = password.to_owned();
        let stored = stored.to_owned();
        blocking(move || {
            let Ok(parsed) = PasswordHash::new(&stored) else {
                return Ok(false);
            };
            Ok(hasher.verify_password(password.as_bytes(), &parsed).is_ok())
        })
        .await
    }
}
