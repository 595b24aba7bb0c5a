use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Agency-level permissions checked before admin-side operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "view agency")]
    ViewAgency,
    #[serde(rename = "edit agency")]
    EditAgency,
    #[serde(rename = "delete agency")]
    DeleteAgency,
    #[serde(rename = "create agency")]
    CreateAgency,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::ViewAgency,
        Permission::EditAgency,
        Permission::DeleteAgency,
        Permission::CreateAgency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewAgency => "view agency",
            Permission::EditAgency => "edit agency",
            Permission::DeleteAgency => "delete agency",
            Permission::CreateAgency => "create agency",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL.into_iter().find(|p| p.as_str() == normalized)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated admin caller, inserted into request extensions by the admin middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub subject: String,
    pub permissions: BTreeSet<Permission>,
}

impl Principal {
    pub fn new(subject: impl Into<String>, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            subject: subject.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!("Missing permission: {}", permission)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_permission() {
        assert_eq!(Permission::parse("View Agency"), Some(Permission::ViewAgency));
        assert_eq!(Permission::parse(" create agency "), Some(Permission::CreateAgency));
        assert_eq!(Permission::parse("administer"), None);
    }

    #[test]
    fn test_principal_require() {
        let principal = Principal::new("admin", [Permission::ViewAgency]);
        assert!(principal.require(Permission::ViewAgency).is_ok());
        assert!(matches!(
            principal.require(Permission::EditAgency),
            Err(AppError::Forbidden(_))
        ));
    }
}
