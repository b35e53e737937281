//! Authorization context
//!
//! An [`Authz`] holds the authorization information of one identity for the
//! duration of a request (or a background job acting on someone's behalf).
//! Contexts are built by the [`AuthzEngine`](crate::AuthzEngine), either from
//! a role record or from a session token, and are never persisted.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::engine::EngineInner;
use crate::error::Result;
use crate::store::RoleStore;
use crate::token::SessionClaims;
use crate::types::{Action, CollectionId, Role, RoleId};

/// Authorization context for one identity
pub struct Authz {
    id: Option<RoleId>,
    logged_in: bool,
    roles: HashSet<RoleId>,
    is_admin: bool,
    session_write: bool,
    expire: DateTime<Utc>,

    /// Grant sets resolved by this instance, never invalidated
    pub(crate) collections: DashMap<Action, Vec<CollectionId>>,

    pub(crate) engine: Arc<EngineInner>,
}

impl Authz {
    pub(crate) fn new(
        engine: Arc<EngineInner>,
        id: Option<RoleId>,
        roles: impl IntoIterator<Item = RoleId>,
        is_admin: bool,
        expire: Option<DateTime<Utc>>,
    ) -> Self {
        let logged_in = id.is_some();
        let session_write = !engine.settings.maintenance && logged_in;
        let expire = expire.unwrap_or_else(|| {
            engine
                .settings
                .expiry_from(Utc::now())
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Self {
            id,
            logged_in,
            roles: roles.into_iter().collect(),
            is_admin,
            session_write,
            expire,
            collections: DashMap::new(),
            engine,
        }
    }

    /// Build the implicit role set of a role record
    ///
    /// Every context gets the guest role. A present, unblocked role adds its
    /// own id, the authenticated-user role and its groups.
    pub(crate) fn from_role(engine: Arc<EngineInner>, role: Option<&Role>) -> Self {
        let mut roles = vec![engine.roles.guest_role_id()];

        match role {
            Some(role) if !role.is_blocked => {
                roles.push(role.id);
                roles.push(engine.roles.user_role_id());
                roles.extend(role.groups.iter().copied());
                Self::new(engine, Some(role.id), roles, role.is_admin, None)
            }
            _ => Self::new(engine, None, roles, false, None),
        }
    }

    /// Role id of the identity, `None` when anonymous
    pub fn id(&self) -> Option<RoleId> {
        self.id
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn roles(&self) -> &HashSet<RoleId> {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Whether this context may write, fixed when the context was built
    pub fn session_write(&self) -> bool {
        self.session_write
    }

    pub fn expire(&self) -> DateTime<Utc> {
        self.expire
    }

    /// Load the role record of the identity
    pub async fn role(&self) -> Result<Option<Role>> {
        match self.id {
            Some(id) => self.engine.roles.load_role_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Roles of this context that are not shared by everyone
    pub async fn private_roles(&self) -> Result<HashSet<RoleId>> {
        if !self.logged_in {
            return Ok(HashSet::new());
        }
        let public = self.engine.roles.public_role_ids().await?;
        Ok(self.roles.difference(&public).copied().collect())
    }

    /// Issue a session token for this context
    ///
    /// `expire` overrides the context expiry. `role` embeds a snapshot of a
    /// role record without its timestamps.
    pub fn to_token(
        &self,
        scope: Option<&str>,
        role: Option<&Role>,
        expire: Option<DateTime<Utc>>,
    ) -> Result<String> {
        let mut roles: Vec<RoleId> = self.roles.iter().copied().collect();
        roles.sort_unstable();

        let mut claims = SessionClaims {
            subject: self.id,
            exp: expire.unwrap_or(self.expire).timestamp(),
            roles,
            is_admin: self.is_admin,
            scope: scope.map(str::to_string),
            role: None,
        };
        if let Some(role) = role {
            claims = claims.with_role(role)?;
        }

        self.engine.codec.encode(&claims)
    }
}

impl fmt::Display for Authz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Authz({})>", id),
            None => write!(f, "<Authz(None)>"),
        }
    }
}

impl fmt::Debug for Authz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authz")
            .field("id", &self.id)
            .field("roles", &self.roles)
            .field("is_admin", &self.is_admin)
            .field("session_write", &self.session_write)
            .field("expire", &self.expire)
            .finish()
    }
}
