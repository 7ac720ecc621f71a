use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform roles carried on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Admin,
    SuperAdmin,
    Beta,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super-admin",
            UserRole::Beta => "beta",
        }
    }
}

/// User entity - represents a member of the community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with generated ID and timestamps.
    pub fn new(username: String, display_name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            display_name,
            email,
            password_hash,
            verified: false,
            roles: Vec::new(),
            country: None,
            deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The username, or `None` when the profile is missing one.
    pub fn username(&self) -> Option<&str> {
        let name = self.username.trim();
        (!name.is_empty()).then_some(name)
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.contains(&role)
    }

    /// Admins and super-admins.
    pub fn has_admin_rights(&self) -> bool {
        self.has_role(UserRole::Admin) || self.has_role(UserRole::SuperAdmin)
    }

    /// Whether `identifier` names this user, by id or by username.
    pub fn is_identified_by(&self, identifier: &str) -> bool {
        if identifier.is_empty() {
            return false;
        }
        self.username() == Some(identifier) || self.id.to_string() == identifier
    }

    pub fn with_roles(mut self, roles: Vec<UserRole>) -> Self {
        self.roles = roles;
        self
    }
}
