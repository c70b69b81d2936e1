use serde::{Deserialize, Serialize};

/// A repository label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    /// Hex color without the leading `#`.
    pub color: String,
}

/// A repository listed under an organization.
#[derive(Debug, Clone)]
pub struct OrgRepo {
    pub name: String,
    pub archived: bool,
}

/// One page of an organization's repositories.
#[derive(Debug, Clone, Default)]
pub struct RepoPage {
    pub repos: Vec<OrgRepo>,
    pub has_next: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub author_id: u64,
    pub author: String,
    pub state: ReviewState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

impl ReviewState {
    /// Parse a review state as GitHub spells it, either in the REST API
    /// (`APPROVED`) or in webhook payloads (`approved`).
    pub fn parse(state: &str) -> Self {
        match state.to_ascii_uppercase().as_str() {
            "APPROVED" => ReviewState::Approved,
            "CHANGES_REQUESTED" => ReviewState::ChangesRequested,
            "DISMISSED" => ReviewState::Dismissed,
            "PENDING" => ReviewState::Pending,
            _ => ReviewState::Commented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_state_parse_accepts_both_spellings() {
        assert_eq!(ReviewState::parse("APPROVED"), ReviewState::Approved);
        assert_eq!(ReviewState::parse("approved"), ReviewState::Approved);
        assert_eq!(
            ReviewState::parse("changes_requested"),
            ReviewState::ChangesRequested
        );
        assert_eq!(ReviewState::parse("DISMISSED"), ReviewState::Dismissed);
        assert_eq!(ReviewState::parse("commented"), ReviewState::Commented);
    }
}
