//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use saltbox_core::{Email, Role, UserId};

/// A registered user (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized email address, unique across users.
    pub email: Email,
    /// The user's role.
    pub role: Role,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The authenticated actor resolved from a bearer token.
///
/// This is the `{subject id, role}` claim pair the auth gate hands to route
/// guards, plus the display name for responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}
