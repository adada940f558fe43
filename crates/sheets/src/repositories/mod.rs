//! Per-worksheet repositories.
//!
//! Each repository is a zero-sized struct with static async methods taking the
//! caller's [`SheetSession`](crate::session::SheetSession). Reads go through
//! the session cache; writes go through the key-addressed row mutator.

pub mod comment_repo;
pub mod like_repo;
pub mod participant_repo;
pub mod progress_repo;
pub mod project_repo;
pub mod team_repo;
pub mod update_repo;

pub use comment_repo::CommentRepo;
pub use like_repo::LikeRepo;
pub use participant_repo::ParticipantRepo;
pub use progress_repo::ProgressRepo;
pub use project_repo::ProjectRepo;
pub use team_repo::TeamRepo;
pub use update_repo::UpdateRepo;
