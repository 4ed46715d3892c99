use serde::Serialize;

use partsledger_core::UserId;

use crate::{JwtClaims, Permission, Role, permissions_for};

/// A fully resolved principal for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub principal_id: UserId,
    pub roles: Vec<Role>,
    pub confirmed: bool,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(principal_id: UserId, roles: Vec<Role>, confirmed: bool) -> Self {
        let permissions = permissions_for(&roles, confirmed);
        Self {
            principal_id,
            roles,
            confirmed,
            permissions,
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub, claims.roles.clone(), claims.confirmed)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::ADMIN)
    }
}
