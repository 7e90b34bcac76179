//! `netbill-directory` — the organization (tenant) directory and its
//! client-side resolver.
//!
//! The Organization Service owns the canonical records (`store`); the Auth
//! Service consults them through the `resolver`, which caches briefly and
//! fails closed when the Directory cannot answer.

pub mod cache;
pub mod model;
pub mod resolver;
pub mod store;

pub use cache::TtlCache;
pub use model::{
    NewOrganization, OrgType, Organization, OrganizationSummary, RevenueShareConfig,
};
pub use resolver::{DirectoryClient, HttpDirectoryClient, OrganizationResolver};
pub use store::{DirectoryStore, InMemoryDirectory};
