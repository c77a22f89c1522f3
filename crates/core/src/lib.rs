//! Domain rules for the engagement lifecycle.
//!
//! Everything in this crate is pure: state machines, validation, and the
//! arithmetic behind cached aggregates. Persistence and locking live in
//! `gigboard-db`; delivery of [`notice::Notice`]s lives in `gigboard-events`.

pub mod attachment;
pub mod contract;
pub mod dispute;
pub mod error;
pub mod job;
pub mod ledger;
pub mod milestone;
pub mod notice;
pub mod project;
pub mod proposal;
pub mod reputation;
pub mod roles;
pub mod status;
pub mod types;
