//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that run inside another
//! repository's transaction take `&mut PgConnection` and are `pub(crate)`.

pub mod contract_repo;
pub mod dispute_repo;
pub mod job_repo;
pub mod notification_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod proposal_repo;
pub mod review_repo;
pub mod user_repo;
pub mod wallet_repo;

pub use contract_repo::ContractRepo;
pub use dispute_repo::DisputeRepo;
pub use job_repo::JobRepo;
pub use notification_repo::NotificationRepo;
pub use profile_repo::ProfileRepo;
pub use project_repo::ProjectRepo;
pub use proposal_repo::ProposalRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;
pub use wallet_repo::WalletRepo;
