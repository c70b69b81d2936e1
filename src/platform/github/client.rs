use async_trait::async_trait;
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::GitHubConfig;
use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::auth::{generate_app_jwt, load_private_key};
use super::mapper;

const REVIEWS_PER_PAGE: usize = 100;

pub struct GitHubPlatform {
    app_id: u64,
    private_key: EncodingKey,
    /// Cache of installation tokens: installation_id -> (token, expiry)
    token_cache: Arc<RwLock<HashMap<u64, (String, chrono::DateTime<chrono::Utc>)>>>,
}

impl GitHubPlatform {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let private_key = load_private_key(config)?;

        Ok(Self {
            app_id: config.app_id,
            private_key,
            token_cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Get an octocrab instance authenticated as an installation.
    async fn installation_client(&self, installation_id: u64) -> Result<Octocrab> {
        let token = self.get_access_token(installation_id).await?;
        Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build octocrab client: {e}")))
    }
}

fn label_route(owner: &str, repo: &str, name: &str) -> String {
    format!(
        "/repos/{owner}/{repo}/labels/{}",
        urlencoding::encode(name)
    )
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn get_access_token(&self, installation_id: u64) -> Result<String> {
        // Check cache
        {
            let cache = self.token_cache.read().await;
            if let Some((token, expiry)) = cache.get(&installation_id) {
                if *expiry > chrono::Utc::now() + chrono::Duration::minutes(5) {
                    return Ok(token.clone());
                }
            }
        }

        // Generate new token
        let jwt = generate_app_jwt(self.app_id, &self.private_key)?;

        let client = Octocrab::builder()
            .personal_token(jwt)
            .build()
            .map_err(|e| AppError::Auth(format!("Failed to build JWT client: {e}")))?;

        let url = format!("/app/installations/{installation_id}/access_tokens");
        let response: serde_json::Value = client
            .post(&url, None::<&()>)
            .await
            .map_err(|e| AppError::Auth(format!("Failed to create installation token: {e}")))?;

        let token = response["token"]
            .as_str()
            .ok_or_else(|| AppError::Auth("No token in response".to_string()))?
            .to_string();

        let expires_at = response["expires_at"]
            .as_str()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|| chrono::Utc::now() + chrono::Duration::hours(1));

        tracing::debug!(installation_id, %expires_at, "Minted installation token");

        // Cache the token
        let mut cache = self.token_cache.write().await;
        cache.insert(installation_id, (token.clone(), expires_at));

        Ok(token)
    }

    async fn list_labels(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Label>> {
        let client = self.installation_client(installation_id).await?;

        let first_page = client
            .issues(owner, repo)
            .list_labels_for_repo()
            .per_page(100)
            .send()
            .await?;

        let labels = client.all_pages(first_page).await?;

        Ok(labels.into_iter().map(mapper::map_label).collect())
    }

    async fn create_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()> {
        let client = self.installation_client(installation_id).await?;

        client
            .issues(owner, repo)
            .create_label(name, color, "")
            .await?;

        Ok(())
    }

    async fn update_label_color(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()> {
        let client = self.installation_client(installation_id).await?;

        let _: octocrab::models::Label = client
            .patch(
                label_route(owner, repo, name),
                Some(&serde_json::json!({ "color": color })),
            )
            .await?;

        Ok(())
    }

    async fn delete_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<()> {
        let client = self.installation_client(installation_id).await?;

        // 204 No Content, so skip body deserialization and only check the status
        let response = client
            ._delete(label_route(owner, repo, name), None::<&()>)
            .await?;
        octocrab::map_github_error(response).await?;

        Ok(())
    }

    async fn add_labels(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> Result<()> {
        let client = self.installation_client(installation_id).await?;

        client
            .issues(owner, repo)
            .add_labels(issue_number, labels)
            .await?;

        Ok(())
    }

    async fn remove_label(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> Result<()> {
        let client = self.installation_client(installation_id).await?;

        let url = format!(
            "/repos/{owner}/{repo}/issues/{issue_number}/labels/{}",
            urlencoding::encode(label)
        );
        let _: serde_json::Value = client
            .delete(&url, None::<&()>)
            .await
            .map_err(|e| AppError::GitHubApi(format!("Failed to remove label: {e}")))?;

        Ok(())
    }

    async fn list_reviews(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>> {
        let client = self.installation_client(installation_id).await?;

        let mut result = Vec::new();
        let mut page = 1u32;
        loop {
            let url = format!(
                "/repos/{owner}/{repo}/pulls/{pr_number}/reviews?per_page={REVIEWS_PER_PAGE}&page={page}"
            );
            let batch: Vec<mapper::ReviewResponse> = client
                .get(&url, None::<&()>)
                .await
                .map_err(|e| AppError::GitHubApi(format!("Failed to fetch reviews: {e}")))?;

            let done = batch.len() < REVIEWS_PER_PAGE;
            result.extend(batch.into_iter().filter_map(mapper::map_review));

            if done {
                break;
            }
            page += 1;
        }

        Ok(result)
    }

    async fn list_org_repos(
        &self,
        installation_id: u64,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepoPage> {
        let client = self.installation_client(installation_id).await?;

        let response = client
            .orgs(org)
            .list_repos()
            .repo_type(octocrab::params::repos::Type::All)
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        Ok(RepoPage {
            has_next: response.next.is_some(),
            repos: response.items.into_iter().map(mapper::map_repo).collect(),
        })
    }
}
