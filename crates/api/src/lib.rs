//! HTTP API: routers, middleware, and request/response mapping for the
//! two NetBill services.
//!
//! - `auth_app`: the Auth Service (login/tokens, users, roles)
//! - `org_app`: the Organization Service (tenant directory)
//! - `middleware`: bearer-token authentication for both
//! - `errors`: the shared `{success, message, data, errors}` envelope

pub mod auth_app;
pub mod dto;
pub mod errors;
pub mod middleware;
pub mod org_app;
