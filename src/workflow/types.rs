use std::fmt;

/// The pull request (issue) a label change applies to.
#[derive(Debug, Clone)]
pub struct PullRequestTarget {
    pub installation_id: u64,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// What provisioning changed on one repository.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub created: Vec<String>,
    pub recolored: Vec<String>,
    pub deleted: Vec<String>,
}

impl ProvisionReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.recolored.is_empty() && self.deleted.is_empty()
    }
}

/// Outcome of an organization-wide provisioning sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub pages: u32,
    pub provisioned: usize,
    /// Archived repositories left untouched.
    pub skipped: usize,
}
