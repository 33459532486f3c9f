//! `annostack-auth` — access-control boundary consulted by entity services.
//!
//! This crate is intentionally decoupled from HTTP and storage: it answers
//! "may this user do that in this container?" and validates bearer tokens.

pub mod acl;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use acl::{AccessPolicy, AllowAll, AuthzError, InMemoryAcl};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
pub use roles::Role;
