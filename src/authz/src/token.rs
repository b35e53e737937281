//! Session token encoding and verification
//!
//! A session token is a JWT carrying a snapshot of an authorization context:
//!
//! | claim  | meaning                                   |
//! |--------|-------------------------------------------|
//! | `u`    | role id of the subject, `null` if anonymous |
//! | `exp`  | expiry, unix seconds                       |
//! | `r`    | role ids of the context                    |
//! | `a`    | admin flag                                 |
//! | `s`    | optional scope the token was issued for    |
//! | `role` | optional role record snapshot              |
//!
//! The signature protects integrity only; claims are readable by anyone
//! holding the token.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Role, RoleId};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject role id
    #[serde(rename = "u")]
    pub subject: Option<RoleId>,

    /// Expiry (unix seconds)
    pub exp: i64,

    /// Role set
    #[serde(rename = "r", default)]
    pub roles: Vec<RoleId>,

    /// Admin flag
    #[serde(rename = "a", default)]
    pub is_admin: bool,

    /// Intended use of the token
    #[serde(rename = "s", default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Role record snapshot, without timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<serde_json::Value>,
}

impl SessionClaims {
    /// Attach a role snapshot, dropping its creation and update timestamps
    pub fn with_role(mut self, role: &Role) -> Result<Self> {
        let mut value = serde_json::to_value(role)?;
        if let Some(fields) = value.as_object_mut() {
            fields.remove("created_at");
            fields.remove("updated_at");
        }
        self.role = Some(value);
        Ok(self)
    }
}

/// Token codec trait
///
/// `decode` must reject tokens with a bad signature, a past expiry or a
/// malformed structure. Scope checks happen above the codec.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &SessionClaims) -> Result<String>;

    fn decode(&self, token: &str) -> Result<SessionClaims>;
}

/// HMAC-signed JWT codec
pub struct JwtTokenCodec {
    alg: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenCodec {
    /// Create an HS256 codec from a shared secret
    pub fn new(secret: &[u8]) -> Self {
        Self::with_algorithm(secret, Algorithm::HS256)
    }

    /// Create a codec for one of the HMAC algorithms
    pub fn with_algorithm(secret: &[u8], alg: Algorithm) -> Self {
        Self {
            alg,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode(&self, claims: &SessionClaims) -> Result<String> {
        let token = jsonwebtoken::encode(&Header::new(self.alg), claims, &self.encoding_key)?;
        Ok(token)
    }

    fn decode(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(self.alg);
        validation.leeway = 0;
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
