//! Decision functions
//!
//! Every check answers with a boolean. Bad identifiers, missing privileges and
//! anonymous callers are denials; only store and cache failures are errors.

use crate::context::Authz;
use crate::error::Result;
use crate::types::{Action, EntityRef, RoleId};

impl Authz {
    /// Check whether this context may perform `action` on a collection
    ///
    /// Writes are refused outright when the context cannot write, even for
    /// admins. Admins otherwise pass without consulting any grant set.
    pub async fn can(&self, collection: impl EntityRef, action: Action) -> Result<bool> {
        if action == Action::Write && !self.session_write() {
            return Ok(false);
        }
        if self.is_admin() {
            return Ok(true);
        }

        let Some(collection_id) = collection.entity_id() else {
            return Ok(false);
        };
        Ok(self.collections(action).await?.contains(&collection_id))
    }

    pub fn can_bulk_import(&self) -> bool {
        self.session_write() && self.logged_in()
    }

    /// Check whether this context may modify a role (e.g. manage a group)
    pub async fn can_write_role(&self, role: impl EntityRef) -> Result<bool> {
        if !self.session_write() {
            return Ok(false);
        }
        if self.is_admin() {
            return Ok(true);
        }

        let Some(role_id) = role.entity_id() else {
            return Ok(false);
        };
        Ok(self.private_roles().await?.contains(&role_id))
    }

    pub fn can_read_role(&self, role: impl EntityRef) -> bool {
        if self.is_admin() {
            return true;
        }
        role.entity_id()
            .is_some_and(|role_id| self.roles().contains(&role_id))
    }

    /// Whether a new account may be registered from this context
    pub fn can_register(&self) -> bool {
        let settings = &self.engine.settings;
        !(self.logged_in() || settings.maintenance || !settings.password_login)
    }

    /// Check whether any of `roles` is in this context's role set
    pub fn match_roles<I>(&self, roles: I) -> bool
    where
        I: IntoIterator<Item = RoleId>,
    {
        roles.into_iter().any(|role_id| self.roles().contains(&role_id))
    }
}
