//! `annostack-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, optimistic version expectations and the
//! typed half of the domain adapter contract every mutable entity implements.

pub mod entity;
pub mod error;
pub mod id;
pub mod version;

pub use entity::{CommandKind, DomainEntity, EntityRef, ResolvedRefs};
pub use error::{DomainError, DomainResult};
pub use id::{CommandId, ContainerId, EntityId, ProjectId, TransactionId, UserId};
pub use version::ExpectedVersion;
