pub mod counter_store;
pub mod interaction_log;
pub mod interactions;
pub mod vote_buffer;

pub use counter_store::{CounterStore, PgCounterStore};
pub use interaction_log::{InteractionLog, PgInteractionLog};
pub use interactions::{BatchOutcome, InteractionService};
pub use vote_buffer::{MemoryVoteBuffer, RedisVoteBuffer, VoteBuffer};
