pub mod contracts;
pub mod disputes;
pub mod freelancers;
pub mod jobs;
pub mod notifications;
pub mod projects;
pub mod proposals;
pub mod reviews;
pub mod users;
pub mod wallet;
