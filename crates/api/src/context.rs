use partsledger_auth::{Principal, Role};
use partsledger_core::UserId;

/// Principal context for a request (authenticated identity + resolved permissions).
///
/// Inserted by the auth middleware; handlers read it as an `Extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> UserId {
        self.principal.principal_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.principal.roles
    }

    pub fn confirmed(&self) -> bool {
        self.principal.confirmed
    }
}
