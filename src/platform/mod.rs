#[cfg(test)]
pub mod fake;
pub mod github;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// Installation-scoped operations on the code hosting platform.
///
/// Every call authenticates as `installation_id`; an authentication failure
/// surfaces as the call's error.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Get an installation-scoped access token.
    async fn get_access_token(&self, installation_id: u64) -> Result<String>;

    /// List every label defined on a repository.
    async fn list_labels(&self, installation_id: u64, owner: &str, repo: &str)
        -> Result<Vec<Label>>;

    async fn create_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()>;

    /// Change the color of an existing repository label.
    async fn update_label_color(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()>;

    /// Delete a label from a repository.
    async fn delete_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<()>;

    /// Add labels to an issue or PR.
    async fn add_labels(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> Result<()>;

    /// Remove a label from an issue or PR. Fails when the label is not attached.
    async fn remove_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> Result<()>;

    /// Fetch reviews on a PR, oldest first.
    async fn list_reviews(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>>;

    /// Fetch one page (1-based) of an organization's repositories.
    async fn list_org_repos(
        &self,
        installation_id: u64,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepoPage>;
}
