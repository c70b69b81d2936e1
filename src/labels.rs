//! Pull request lifecycle labels and the rules that decide which one a PR carries.
//!
//! Everything here is pure: the workflows turn a [`LabelPlan`] into API calls.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::platform::types::{Review, ReviewState};

/// One of the four mutually exclusive lifecycle labels owned by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManagedLabel {
    WorkInProgress,
    ReadyForReview,
    FirstApproval,
    ReadyToMerge,
}

impl ManagedLabel {
    pub const ALL: [ManagedLabel; 4] = [
        ManagedLabel::WorkInProgress,
        ManagedLabel::ReadyForReview,
        ManagedLabel::FirstApproval,
        ManagedLabel::ReadyToMerge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ManagedLabel::WorkInProgress => "work in progress",
            ManagedLabel::ReadyForReview => "ready for review",
            ManagedLabel::FirstApproval => "first approval",
            ManagedLabel::ReadyToMerge => "ready to merge",
        }
    }

    /// Canonical display color, hex without the leading `#`.
    pub fn color(self) -> &'static str {
        match self {
            ManagedLabel::WorkInProgress => "0052cc",
            ManagedLabel::ReadyForReview => "fef2c0",
            ManagedLabel::FirstApproval => "bfe5bf",
            ManagedLabel::ReadyToMerge => "0e8a16",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.name() == name)
    }
}

impl fmt::Display for ManagedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Label changes for one pull request: at most one addition, any number of
/// removals. Removals of absent labels are expected to fail and be ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPlan {
    pub add: Option<ManagedLabel>,
    pub remove: Vec<ManagedLabel>,
}

impl LabelPlan {
    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.remove.is_empty()
    }

    /// Apply the plan to an in-memory label set, in the same order the
    /// workflows issue API calls (add first, then removals).
    pub fn apply_to(&self, labels: &mut BTreeSet<String>) {
        if let Some(label) = self.add {
            labels.insert(label.name().to_string());
        }
        for label in &self.remove {
            labels.remove(label.name());
        }
    }
}

/// Count reviewers whose latest approval-relevant review is an approval.
///
/// Reviews are expected in submission order, as GitHub lists them. Comment-only
/// and pending reviews leave a reviewer's standing unchanged; a later
/// changes-requested or dismissed review withdraws an earlier approval.
pub fn count_distinct_approvers(reviews: &[Review]) -> usize {
    let mut latest: HashMap<u64, bool> = HashMap::new();

    for review in reviews {
        match review.state {
            ReviewState::Approved => {
                latest.insert(review.author_id, true);
            }
            ReviewState::ChangesRequested | ReviewState::Dismissed => {
                latest.insert(review.author_id, false);
            }
            ReviewState::Commented | ReviewState::Pending => {}
        }
    }

    latest.values().filter(|approved| **approved).count()
}

/// Initial label for a newly opened pull request. PRs that already carry any
/// label are left alone.
pub fn plan_for_opened(draft: bool, has_labels: bool) -> LabelPlan {
    if has_labels {
        return LabelPlan::default();
    }

    let label = if draft {
        ManagedLabel::WorkInProgress
    } else {
        ManagedLabel::ReadyForReview
    };

    LabelPlan {
        add: Some(label),
        remove: Vec::new(),
    }
}

pub fn plan_for_ready_for_review() -> LabelPlan {
    LabelPlan {
        add: Some(ManagedLabel::ReadyForReview),
        remove: vec![ManagedLabel::WorkInProgress],
    }
}

/// Labels dictated by the number of distinct approvers.
///
/// `threshold` is the approval count that makes a PR ready to merge; values
/// below two are treated as two.
pub fn plan_for_approvals(approvers: usize, threshold: usize) -> LabelPlan {
    let threshold = threshold.max(2);

    match approvers {
        0 => LabelPlan {
            add: None,
            remove: vec![ManagedLabel::ReadyToMerge, ManagedLabel::FirstApproval],
        },
        n if n >= threshold => LabelPlan {
            add: Some(ManagedLabel::ReadyToMerge),
            remove: vec![ManagedLabel::ReadyForReview, ManagedLabel::FirstApproval],
        },
        _ => LabelPlan {
            add: Some(ManagedLabel::FirstApproval),
            remove: vec![ManagedLabel::ReadyToMerge],
        },
    }
}
