pub mod analysis;
pub mod config;
pub mod domain;
pub mod export;
pub mod ingestion;
pub mod utils;

pub use analysis::{StanceDetectionPipeline, TextGenerator};
pub use domain::{Comment, ContributionId, Stance, StanceResult, Target};
pub use ingestion::{join_contributions_comments, CommentLoader, ContributionLoader};
