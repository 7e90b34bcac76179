//! `netbill-core` — shared foundation for both NetBill services.
//!
//! This crate contains **pure** building blocks (no IO, no framework
//! concerns): strongly-typed identifiers, the platform error model, and the
//! clock abstraction everything time-dependent is written against.

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use id::{AssignmentId, OrganizationId, RoleId, UserId};
