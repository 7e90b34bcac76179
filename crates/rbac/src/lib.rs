//! `netbill-rbac` — authorization policy for organization-scoped access.
//!
//! The security context assembled per request, the requirement evaluator,
//! the role/assignment model with its audit trail, and the permission
//! registry. Pure policy plus an in-memory store; no HTTP, no engine.

pub mod builder;
pub mod context;
pub mod evaluate;
pub mod level;
pub mod permissions;
pub mod role;
pub mod store;

pub use builder::{context_from_claims, ContextBuilder};
pub use context::{OrgScope, SecurityContext};
pub use evaluate::{authorize, Requirement};
pub use level::RoleLevel;
pub use permissions::{PermissionId, PermissionRegistry};
pub use role::{NewRole, Role, RoleAssignment, UserRef};
pub use store::{InMemoryRoleStore, RoleStore};
