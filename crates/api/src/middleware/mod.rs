//! Request extractors: [`auth::AuthUser`] for any signed-in caller and
//! [`rbac::RequireAdmin`] for the administrator routes.

pub mod auth;
pub mod rbac;
