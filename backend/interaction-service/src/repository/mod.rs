pub mod comments;
pub mod posts;
pub mod reports;

pub use comments::CommentRepository;
pub use posts::PostRepository;
pub use reports::ReportRepository;
