use serde::Deserialize;

use crate::platform::types::{self, ReviewState};

/// Review as returned by `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Deserialize)]
pub struct ReviewResponse {
    pub id: u64,
    pub state: String,
    /// `null` for reviews left by deleted accounts.
    pub user: Option<ReviewUser>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewUser {
    pub id: u64,
    pub login: String,
}

/// Map a REST review to our platform Review type. Reviews without an author
/// cannot be attributed and are dropped.
pub fn map_review(review: ReviewResponse) -> Option<types::Review> {
    let user = review.user?;
    Some(types::Review {
        id: review.id,
        author_id: user.id,
        author: user.login,
        state: ReviewState::parse(&review.state),
    })
}

pub fn map_label(label: octocrab::models::Label) -> types::Label {
    types::Label {
        name: label.name,
        color: label.color,
    }
}

pub fn map_repo(repo: octocrab::models::Repository) -> types::OrgRepo {
    types::OrgRepo {
        name: repo.name,
        archived: repo.archived.unwrap_or(false),
    }
}
