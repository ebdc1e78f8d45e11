pub mod redis_health;
pub mod vote_sync;

pub use vote_sync::VoteSyncWorker;
