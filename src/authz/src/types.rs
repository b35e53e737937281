//! Core authorization types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique role identifier
pub type RoleId = i64;

/// Unique collection identifier
pub type CollectionId = i64;

/// Action a grant covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read access to a collection
    Read,
    /// Write access to a collection
    Write,
}

impl Action {
    /// All actions grants are resolved for
    pub const ALL: [Action; 2] = [Action::Read, Action::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of role record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    /// An individual account
    User,
    /// A group other roles belong to
    Group,
    /// A built-in role (guest, authenticated users)
    System,
}

/// Role record as kept by the role store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier
    pub id: RoleId,

    /// External identifier (e.g., "password:alice@example.com")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,

    /// Display name
    pub name: String,

    /// Contact address for user roles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "type")]
    pub role_type: RoleType,

    /// Administrators bypass collection-level checks
    #[serde(default)]
    pub is_admin: bool,

    /// Blocked roles are treated as anonymous
    #[serde(default)]
    pub is_blocked: bool,

    /// Group roles this role belongs to
    #[serde(default)]
    pub groups: Vec<RoleId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    /// Create a new user role
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            foreign_id: None,
            name: name.into(),
            email: None,
            role_type: RoleType::User,
            is_admin: false,
            is_blocked: false,
            groups: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Create a new group role
    pub fn group(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            role_type: RoleType::Group,
            ..Self::new(id, name)
        }
    }

    pub fn with_groups(mut self, groups: impl IntoIterator<Item = RoleId>) -> Self {
        self.groups.extend(groups);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn blocked(mut self) -> Self {
        self.is_blocked = true;
        self
    }
}

/// Collection record, the unit access is granted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub label: String,
}

impl Collection {
    pub fn new(id: CollectionId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// Anything that may identify a collection or role
///
/// Returns `None` when the value is absent or is not a valid integer
/// identifier. Decision functions treat `None` as a denial.
pub trait EntityRef {
    fn entity_id(&self) -> Option<i64>;
}

impl EntityRef for i64 {
    fn entity_id(&self) -> Option<i64> {
        Some(*self)
    }
}

impl EntityRef for i32 {
    fn entity_id(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl EntityRef for u32 {
    fn entity_id(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl EntityRef for str {
    fn entity_id(&self) -> Option<i64> {
        self.trim().parse().ok()
    }
}

impl EntityRef for String {
    fn entity_id(&self) -> Option<i64> {
        self.as_str().entity_id()
    }
}

impl EntityRef for Collection {
    fn entity_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl EntityRef for Role {
    fn entity_id(&self) -> Option<i64> {
        Some(self.id)
    }
}

impl<T: EntityRef + ?Sized> EntityRef for &T {
    fn entity_id(&self) -> Option<i64> {
        (**self).entity_id()
    }
}

impl<T: EntityRef> EntityRef for Option<T> {
    fn entity_id(&self) -> Option<i64> {
        self.as_ref().and_then(EntityRef::entity_id)
    }
}
