/// Interaction Client Library
///
/// Client-side half of the interaction pipeline: optimistic local
/// updates applied immediately, a bounded pending queue, and a flush
/// timer that ships the queue to the interaction API as one batch.
/// Flushes are fire-and-forget - the queue is cleared whether or not
/// the network call succeeds, and optimistic state is never rolled
/// back.
///
/// # Modules
///
/// - `aggregator`: Local state, pending queue and the flush timer
/// - `transport`: Batch transport trait and the HTTP implementation
/// - `types`: Interaction actions and local/remote view models
pub mod aggregator;
pub mod transport;
pub mod types;

pub use aggregator::{AggregatorConfig, AggregatorHandle, FeedAggregator};
pub use transport::{BatchTransport, ClientError, HttpTransport};
pub use types::{InteractionAction, InteractionSummary, LocalComment, PendingInteraction, PostInteractions};
