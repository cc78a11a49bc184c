mod comments;
mod contributions;
mod credentials;
mod join;

pub use comments::CommentLoader;
pub use contributions::{ContributionLoader, Contributions};
pub use credentials::load_api_key;
pub use join::{join_contributions_comments, JoinedData, JoinedEntry};
