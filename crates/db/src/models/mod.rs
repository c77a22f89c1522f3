//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` input DTOs for inserts and patches

pub mod contract;
pub mod dispute;
pub mod job;
pub mod notification;
pub mod project;
pub mod proposal;
pub mod review;
pub mod user;
pub mod wallet;
