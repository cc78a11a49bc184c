use super::contributions::Contributions;
use crate::domain::{Comment, CommentId, ContributionId};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A contribution together with the comments written about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedEntry {
    pub contribution_text: String,
    pub comments: Vec<(CommentId, String)>,
}

pub type JoinedData = BTreeMap<ContributionId, JoinedEntry>;

/// Attaches every comment to the contribution its foreign key names.
/// Contributions without comments are left out; comments whose key matches
/// no contribution are dropped.
pub fn join_contributions_comments(contributions: &Contributions, comments: &[Comment]) -> JoinedData {
    let mut by_parent: HashMap<&ContributionId, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        by_parent
            .entry(&comment.contribution_id)
            .or_default()
            .push(comment);
    }

    let mut joined = JoinedData::new();
    for (id, text) in contributions {
        let Some(related) = by_parent.remove(id) else {
            continue;
        };
        joined.insert(
            id.clone(),
            JoinedEntry {
                contribution_text: text.clone(),
                comments: related
                    .into_iter()
                    .map(|comment| (comment.id.clone(), comment.text.clone()))
                    .collect(),
            },
        );
    }

    let orphaned: usize = by_parent.values().map(Vec::len).sum();
    if orphaned > 0 {
        debug!(orphaned, "Kommentare ohne passenden Beitrag");
    }
    info!(
        contributions = contributions.len(),
        commented = joined.len(),
        "Beiträge und Kommentare verknüpft"
    );
    joined
}
