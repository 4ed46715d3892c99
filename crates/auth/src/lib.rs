//! `partsledger-auth` — authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage: the API decodes a bearer token through a
//! [`JwtValidator`], builds a [`Principal`] and checks permissions with
//! [`authorize`].

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, authorize, permissions_for};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
