use serde::Deserialize;

/// Top-level webhook event parsed from the payload based on X-GitHub-Event header.
#[derive(Debug)]
pub enum WebhookEvent {
    Installation(InstallationEvent),
    PullRequest(PullRequestEvent),
    PullRequestReview(PullRequestReviewEvent),
    Repository(RepositoryEvent),
    Ping,
    Unsupported(String),
}

#[derive(Debug, Deserialize)]
pub struct InstallationEvent {
    pub action: String,
    pub installation: InstallationAccountPayload,
}

#[derive(Debug, Deserialize)]
pub struct InstallationAccountPayload {
    pub id: u64,
    pub account: AccountPayload,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
    pub installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestReviewEvent {
    pub action: String,
    pub review: ReviewPayload,
    pub pull_request: PullRequestPayload,
    pub repository: RepositoryPayload,
    pub installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryEvent {
    pub action: String,
    pub repository: RepositoryPayload,
    pub installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub labels: Vec<LabelPayload>,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabelPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub id: u64,
    pub state: String, // "approved", "changes_requested", "commented", "dismissed"
    pub user: Option<AccountPayload>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryPayload {
    pub name: String,
    pub full_name: String,
    pub owner: AccountPayload,
}

#[derive(Debug, Deserialize)]
pub struct AccountPayload {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct InstallationPayload {
    pub id: u64,
}

impl WebhookEvent {
    pub fn parse(event_type: &str, payload: &[u8]) -> Result<Self, serde_json::Error> {
        match event_type {
            "installation" => {
                let event: InstallationEvent = serde_json::from_slice(payload)?;
                Ok(WebhookEvent::Installation(event))
            }
            "pull_request" => {
                let event: PullRequestEvent = serde_json::from_slice(payload)?;
                Ok(WebhookEvent::PullRequest(event))
            }
            "pull_request_review" => {
                let event: PullRequestReviewEvent = serde_json::from_slice(payload)?;
                Ok(WebhookEvent::PullRequestReview(event))
            }
            "repository" => {
                let event: RepositoryEvent = serde_json::from_slice(payload)?;
                Ok(WebhookEvent::Repository(event))
            }
            "ping" => Ok(WebhookEvent::Ping),
            other => Ok(WebhookEvent::Unsupported(other.to_string())),
        }
    }
}
