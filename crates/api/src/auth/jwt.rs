//! Bearer token verification.
//!
//! Tokens are minted by the external identity service and signed with a
//! shared HS256 secret. This service only verifies them; [`issue`] exists so
//! tests and local tooling can mint tokens the same way.

use jobroom_core::roles::{Identity, Role};
use jobroom_core::types::Id;
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Clock skew tolerated when checking `exp`, in seconds.
const LEEWAY_SECS: u64 = 30;

const DEFAULT_TTL_MINS: i64 = 15;

/// Token payload. An unknown `role` fails deserialization, so such tokens
/// never verify. The identity service signs only `sub`, `role`, `iat` and
/// `exp`; `iat` and `jti` are optional here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Id,
    pub role: Role,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.role)
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of tokens minted by [`issue`].
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// `JWT_SECRET` is required. `JWT_ACCESS_EXPIRY_MINS` defaults to 15.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64"),
            Err(_) => DEFAULT_TTL_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

/// Mint a token for `identity`.
pub fn issue(identity: &Identity, config: &JwtConfig) -> Result<String, JwtError> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: identity.user_id,
        role: identity.role,
        exp: iat + config.access_token_expiry_mins * 60,
        iat: Some(iat),
        jti: Some(Uuid::new_v4()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and claim shape.
pub fn verify(token: &str, config: &JwtConfig) -> Result<Claims, JwtError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &JwtConfig::validation(),
    )
    .map(|data| data.claims)
}
