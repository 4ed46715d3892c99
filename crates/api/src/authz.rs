//! API-side authorization guard.
//!
//! Enforced at the handler boundary before the ledger or catalog is called,
//! keeping infra and the domain auth-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use partsledger_auth::{AuthzError, CommandAuthorization, Permission, authorize};

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

/// Check authorization for a command in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    for perm in command.required_permissions() {
        authorize(principal.principal(), perm)?;
    }
    Ok(())
}

/// Single-permission guard for read handlers, already mapped to a 403.
pub fn require(principal: &PrincipalContext, permission: Permission) -> Result<(), Response> {
    authorize(principal.principal(), &permission).map_err(forbidden)
}

pub fn forbidden(err: AuthzError) -> Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}
