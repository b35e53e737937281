//! Authorization engine
//!
//! The engine wires settings, stores, the shared cache and the token codec
//! together and hands out [`Authz`] contexts. It is cheap to clone and is
//! meant to be built once per process.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::SharedCache;
use crate::config::AuthzSettings;
use crate::context::Authz;
use crate::error::Result;
use crate::resolver::{grant_key, GRANT_NAMESPACE};
use crate::store::{PermissionStore, RoleStore};
use crate::token::{JwtTokenCodec, TokenCodec};
use crate::types::{Action, Role, RoleId};

/// Collaborators shared by every context of an engine
pub(crate) struct EngineInner {
    pub(crate) settings: AuthzSettings,
    pub(crate) permissions: Arc<dyn PermissionStore>,
    pub(crate) roles: Arc<dyn RoleStore>,
    pub(crate) cache: Arc<dyn SharedCache>,
    pub(crate) codec: Arc<dyn TokenCodec>,
}

/// Authorization engine
#[derive(Clone)]
pub struct AuthzEngine {
    inner: Arc<EngineInner>,
}

impl AuthzEngine {
    /// Create an engine signing tokens with HS256 and the configured secret
    pub fn new(
        settings: AuthzSettings,
        permissions: Arc<dyn PermissionStore>,
        roles: Arc<dyn RoleStore>,
        cache: Arc<dyn SharedCache>,
    ) -> Result<Self> {
        let codec = Arc::new(JwtTokenCodec::new(settings.secret_key.as_bytes()));
        Self::with_codec(settings, permissions, roles, cache, codec)
    }

    /// Create an engine with a custom token codec
    pub fn with_codec(
        settings: AuthzSettings,
        permissions: Arc<dyn PermissionStore>,
        roles: Arc<dyn RoleStore>,
        cache: Arc<dyn SharedCache>,
        codec: Arc<dyn TokenCodec>,
    ) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            inner: Arc::new(EngineInner {
                settings,
                permissions,
                roles,
                cache,
                codec,
            }),
        })
    }

    pub fn settings(&self) -> &AuthzSettings {
        &self.inner.settings
    }

    /// Build a context from a role record
    ///
    /// Absent and blocked roles yield an anonymous context.
    pub fn from_role(&self, role: Option<&Role>) -> Authz {
        Authz::from_role(self.inner.clone(), role)
    }

    /// Build a context from a known role set
    pub fn context(
        &self,
        id: Option<RoleId>,
        roles: impl IntoIterator<Item = RoleId>,
        is_admin: bool,
        expire: Option<DateTime<Utc>>,
    ) -> Authz {
        Authz::new(self.inner.clone(), id, roles, is_admin, expire)
    }

    /// Rebuild a context from a session token
    ///
    /// Returns `None` for an absent, malformed, expired or foreign-signed
    /// token, and for a token whose embedded scope differs from `scope`.
    pub fn from_token(&self, token: Option<&str>, scope: Option<&str>) -> Option<Authz> {
        let token = token?;

        let claims = match self.inner.codec.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Rejected session token: {}", e);
                return None;
            }
        };

        if let Some(embedded) = claims.scope.as_deref() {
            if Some(embedded) != scope {
                debug!("Rejected session token: scope {:?} != {:?}", embedded, scope);
                return None;
            }
        }

        let expire = Utc.timestamp_opt(claims.exp, 0).single()?;
        Some(self.context(claims.subject, claims.roles, claims.is_admin, Some(expire)))
    }

    /// Drop every cached grant set
    pub async fn flush(&self) -> Result<()> {
        info!("Flushing all cached grants");
        self.inner.cache.delete_namespace(GRANT_NAMESPACE).await
    }

    /// Drop the cached grant sets of one role
    pub async fn flush_role(&self, role_id: RoleId) -> Result<()> {
        info!("Flushing cached grants of role {}", role_id);
        let keys: Vec<String> = Action::ALL
            .iter()
            .map(|action| grant_key(*action, Some(role_id)))
            .collect();
        self.inner.cache.hash_delete(GRANT_NAMESPACE, &keys).await
    }
}
