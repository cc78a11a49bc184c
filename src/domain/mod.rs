mod contribution;
mod stance;
mod target;

pub use contribution::{Comment, CommentId, Contribution, ContributionId};
pub use stance::{Stance, StanceResult};
pub use target::{Target, TargetCategory, TargetMap};
