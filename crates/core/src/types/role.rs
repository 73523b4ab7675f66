//! Actor roles and capability checks.
//!
//! Roles form a closed enumeration; route guards never compare raw role
//! strings. Instead they ask whether a role grants a [`Capability`].

use serde::{Deserialize, Serialize};

/// Role carried by an authenticated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular shopper. Can browse the catalog, manage a cart, and place
    /// orders, but cannot mutate the catalog.
    #[default]
    Customer,
    /// Store staff. Additionally allowed to create, update, and delete
    /// products.
    Admin,
}

/// Something a route may require of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Create, update, or delete catalog products.
    ManageCatalog,
}

impl Role {
    /// Whether this role grants the given capability.
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ManageCatalog => matches!(self, Self::Admin),
        }
    }

    /// Parse a role, falling back to [`Role::Customer`] for unknown or
    /// missing input.
    ///
    /// Registration accepts a free-form role field; anything that is not a
    /// recognized role becomes a plain customer rather than an error.
    #[must_use]
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "customer"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_matrix() {
        assert!(Role::Admin.can(Capability::ManageCatalog));
        assert!(!Role::Customer.can(Capability::ManageCatalog));
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Role::parse_or_default(Some("admin")), Role::Admin);
        assert_eq!(Role::parse_or_default(Some("not-a-role")), Role::Customer);
        assert_eq!(Role::parse_or_default(None), Role::Customer);
    }

    #[test]
    fn test_display_roundtrip() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }
}
