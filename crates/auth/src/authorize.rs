use thiserror::Error;

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("account is not confirmed")]
    Unconfirmed,

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Command-side authorization contract (checked at the command boundary).
///
/// The API layer enforces these requirements before calling the ledger.
pub trait CommandAuthorization {
    fn required_permissions(&self) -> &[Permission];
}

/// Role → permission policy.
///
/// - unconfirmed accounts get nothing, whatever their roles
/// - `admin` gets the wildcard
/// - `clerk` may read and move stock
/// - any other confirmed account may read
pub fn permissions_for(roles: &[Role], confirmed: bool) -> Vec<Permission> {
    if !confirmed {
        return Vec::new();
    }
    if roles.contains(&Role::ADMIN) {
        return vec![Permission::ALL];
    }

    let mut perms = vec![Permission::CATALOG_READ, Permission::STOCK_READ];
    if roles.contains(&Role::CLERK) {
        perms.push(Permission::STOCK_RECEIVE);
        perms.push(Permission::STOCK_TRANSFER);
    }
    perms
}

/// Authorize a principal for one permission.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if !principal.confirmed {
        return Err(AuthzError::Unconfirmed);
    }

    if principal
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required)
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use partsledger_core::UserId;

    use super::*;

    fn principal(roles: &[Role], confirmed: bool) -> Principal {
        Principal::new(UserId::new(), roles.to_vec(), confirmed)
    }

    #[test]
    fn admin_has_wildcard() {
        let p = principal(&[Role::ADMIN], true);
        assert!(p.is_admin());
        assert_eq!(authorize(&p, &Permission::CATALOG_WRITE), Ok(()));
        assert_eq!(authorize(&p, &Permission::new("anything.else")), Ok(()));
    }

    #[test]
    fn clerk_moves_stock_but_cannot_edit_catalog() {
        let p = principal(&[Role::CLERK], true);
        assert_eq!(authorize(&p, &Permission::STOCK_TRANSFER), Ok(()));
        assert_eq!(authorize(&p, &Permission::STOCK_RECEIVE), Ok(()));
        assert_eq!(
            authorize(&p, &Permission::CATALOG_WRITE),
            Err(AuthzError::Forbidden("catalog.write".to_string()))
        );
    }

    #[test]
    fn plain_confirmed_user_is_read_only() {
        let p = principal(&[], true);
        assert_eq!(authorize(&p, &Permission::STOCK_READ), Ok(()));
        assert_eq!(authorize(&p, &Permission::CATALOG_READ), Ok(()));
        assert!(authorize(&p, &Permission::STOCK_TRANSFER).is_err());
    }

    #[test]
    fn unconfirmed_admin_is_denied() {
        let p = principal(&[Role::ADMIN], false);
        assert!(p.permissions.is_empty());
        assert_eq!(
            authorize(&p, &Permission::STOCK_READ),
            Err(AuthzError::Unconfirmed)
        );
    }
}
