pub mod activity_repository;
pub mod challenge_repository;
pub mod progress_repository;

pub use activity_repository::ActivityRepository;
pub use challenge_repository::ChallengeRepository;
pub use progress_repository::{LeaderboardEntry, ProgressRepository};
