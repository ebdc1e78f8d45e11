use std::sync::Arc;

use crate::cache::PostCache;
use crate::repository::{PostRepository, ReportRepository};
use crate::services::InteractionService;

pub mod interactions;
pub mod posts;
pub mod reports;

pub use interactions::{get_interactions, submit_interaction, submit_interaction_batch};
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use reports::{list_admin_reports, submit_report};

/// Shared handler state, built once at startup and injected everywhere
pub struct AppState {
    pub interactions: Arc<InteractionService>,
    pub posts: PostRepository,
    pub reports: ReportRepository,
    pub cache: PostCache,
}
