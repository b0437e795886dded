//! User model, roles, permissions and sessions

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::UserRole;
use crate::error::AppError;

/// Rights levels, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Rights {
    None = 0,
    Read = 1,
    Write = 2,
    Delete = 3,
}

/// Protected resource families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Equipment,
    Failures,
    Maintenance,
    Reports,
    System,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Users,
        Resource::Equipment,
        Resource::Failures,
        Resource::Maintenance,
        Resource::Reports,
        Resource::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Equipment => "equipment",
            Resource::Failures => "failures",
            Resource::Maintenance => "maintenance",
            Resource::Reports => "reports",
            Resource::System => "system",
        }
    }
}

/// Role permission table
pub fn rights_for(role: UserRole, resource: Resource) -> Rights {
    use Resource::*;
    match role {
        UserRole::Superadmin | UserRole::Admin => Rights::Delete,
        UserRole::Technician => match resource {
            Users | System => Rights::Read,
            Equipment | Failures | Maintenance | Reports => Rights::Write,
        },
        UserRole::Viewer => match resource {
            System => Rights::None,
            _ => Rights::Read,
        },
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing, default)]
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub must_change_password: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.map(|until| until > now).unwrap_or(false)
    }

    pub fn display_name(&self) -> String {
        self.full_name.clone().unwrap_or_else(|| self.username.clone())
    }
}

/// User query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Matches username, email or full name
    pub q: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

/// Update user request (administration)
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
    /// Resets the password and forces a change on next login
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

/// Update own profile request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePassword {
    pub current_password: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

/// Stored session row; only a digest of the token is kept
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub token_hash: String,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Identity attached to an authenticated request
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub session_id: i64,
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl SessionUser {
    pub fn rights(&self, resource: Resource) -> Rights {
        rights_for(self.role, resource)
    }

    pub fn require(&self, resource: Resource, needed: Rights) -> Result<(), AppError> {
        if self.rights(resource) >= needed {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Insufficient rights on {}",
                resource.as_str()
            )))
        }
    }

    pub fn require_read(&self, resource: Resource) -> Result<(), AppError> {
        self.require(resource, Rights::Read)
    }

    pub fn require_write(&self, resource: Resource) -> Result<(), AppError> {
        self.require(resource, Rights::Write)
    }

    pub fn require_delete(&self, resource: Resource) -> Result<(), AppError> {
        self.require(resource, Rights::Delete)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Superadmin)
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Rights on every resource, in display order
    pub fn permissions(&self) -> IndexMap<&'static str, Rights> {
        permissions_for(self.role)
    }
}

/// Rights of a role on every resource, in display order
pub fn permissions_for(role: UserRole) -> IndexMap<&'static str, Rights> {
    Resource::ALL
        .iter()
        .map(|r| (r.as_str(), rights_for(role, *r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> SessionUser {
        SessionUser {
            session_id: 1,
            user_id: 1,
            username: "test".to_string(),
            role,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_rights_are_ordered() {
        assert!(Rights::Delete > Rights::Write);
        assert!(Rights::Write > Rights::Read);
        assert!(Rights::Read > Rights::None);
    }

    #[test]
    fn test_technician_rights() {
        let tech = session(UserRole::Technician);
        assert!(tech.require_write(Resource::Failures).is_ok());
        assert!(tech.require_write(Resource::Equipment).is_ok());
        assert!(tech.require_read(Resource::Users).is_ok());
        assert!(tech.require_write(Resource::Users).is_err());
        assert!(tech.require_delete(Resource::Equipment).is_err());
        assert!(tech.require_admin().is_err());
    }

    #[test]
    fn test_viewer_is_read_only() {
        let viewer = session(UserRole::Viewer);
        for resource in Resource::ALL {
            assert!(viewer.require_write(resource).is_err());
        }
        assert!(viewer.require_read(Resource::Reports).is_ok());
        assert!(viewer.require_read(Resource::System).is_err());
    }

    #[test]
    fn test_admins_have_everything() {
        for role in [UserRole::Admin, UserRole::Superadmin] {
            let admin = session(role);
            assert!(admin.require_admin().is_ok());
            for resource in Resource::ALL {
                assert!(admin.require_delete(resource).is_ok());
            }
        }
    }

    #[test]
    fn test_permissions_listing_order() {
        let perms = session(UserRole::Viewer).permissions();
        let keys: Vec<_> = perms.keys().copied().collect();
        assert_eq!(keys.first(), Some(&"users"));
        assert_eq!(perms["system"], Rights::None);
    }
}
