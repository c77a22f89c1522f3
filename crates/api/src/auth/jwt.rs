//! HS256 bearer tokens.
//!
//! Accounts and sign-in live outside this service; it only needs to verify
//! the tokens issued for it and turn them into an engine [`Actor`]. Minting
//! is kept for operator tooling and the integration tests.

use gigboard_core::roles::Actor;
use gigboard_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `iss` claim of every token this service accepts.
pub const TOKEN_ISSUER: &str = "gigboard";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// `client`, `freelancer` or `admin`.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor::new(self.sub, self.role.clone())
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` (required) and `JWT_ACCESS_EXPIRY_MINS` (default 60).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .ok()
            .map(|v| {
                v.parse()
                    .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number of minutes")
            })
            .unwrap_or(DEFAULT_ACCESS_EXPIRY_MINS);

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation
    }
}

/// Sign a token for `actor`.
pub fn issue_token(actor: &Actor, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: actor.user_id,
        role: actor.role.clone(),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigboard_core::roles::{ROLE_CLIENT, ROLE_FREELANCER};

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(iss: &str, exp_offset: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: 7,
            role: ROLE_CLIENT.to_string(),
            iss: iss.to_string(),
            exp: now + exp_offset,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn issued_token_yields_the_same_actor() {
        let cfg = config("engine-secret");
        let actor = Actor::new(42, ROLE_FREELANCER);
        let token = issue_token(&actor, &cfg).unwrap();

        let claims = verify_token(&token, &cfg).unwrap();
        assert_eq!(claims.actor(), actor);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60-second leeway.
        let token = sign(&claims(TOKEN_ISSUER, -300), "engine-secret");
        assert!(verify_token(&token, &config("engine-secret")).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let token = sign(&claims("someone-else", 600), "engine-secret");
        assert!(verify_token(&token, &config("engine-secret")).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&Actor::new(1, ROLE_CLIENT), &config("secret-alpha")).unwrap();
        assert!(verify_token(&token, &config("secret-bravo")).is_err());
    }
}
