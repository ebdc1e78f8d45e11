/// Interaction Service Library
///
/// Backend for the Truthboard anonymous college posting platform. The
/// core of the service is the interaction pipeline: vote events are
/// absorbed by a volatile write buffer and periodically reconciled into
/// the durable counter store as summed atomic increments, while
/// comments and reports are applied synchronously.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Data structures for posts, counters, comments, reports
/// - `services`: Counter store, write buffer, interaction log, API layer
/// - `repository`: Database access layer
/// - `workers`: Vote sync (reconciler) and buffer health background jobs
/// - `cache`: Read-side post caching and invalidation
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod services;
pub mod workers;

pub use config::Config;
pub use error::{AppError, Result};
