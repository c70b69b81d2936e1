use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub github: GitHubConfig,
    #[serde(default)]
    pub labels: LabelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct GitHubConfig {
    /// GitHub App (integration) id used as the JWT issuer.
    pub app_id: u64,
    pub webhook_secret: String,
    /// PEM file holding the app's private key.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    /// Inline private key: PEM (newlines may be written as `*`) or base64 of a PEM.
    #[serde(default)]
    pub private_key: Option<String>,
}

// Manual Debug impl to avoid leaking the webhook secret and key material
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("app_id", &self.app_id)
            .field("webhook_secret", &"[REDACTED]")
            .field("private_key_path", &self.private_key_path)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelConfig {
    /// Distinct approvals needed before a PR is labelled `ready to merge`.
    #[serde(default = "default_approvals_before_ready_to_merge")]
    pub approvals_before_ready_to_merge: usize,
    /// Organization whose repositories get GitHub's default labels removed.
    #[serde(default)]
    pub cleanup_org: Option<String>,
    /// Labels deleted from repositories owned by `cleanup_org`.
    #[serde(default = "default_labels")]
    pub default_labels: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            approvals_before_ready_to_merge: default_approvals_before_ready_to_merge(),
            cleanup_org: None,
            default_labels: default_labels(),
        }
    }
}

impl LabelConfig {
    /// Whether default labels should be removed from repositories of `owner`.
    pub fn cleans_up(&self, owner: &str) -> bool {
        self.cleanup_org
            .as_deref()
            .map_or(false, |org| org.eq_ignore_ascii_case(owner))
    }

    /// Approval threshold for `ready to merge`. One approval is always
    /// `first approval`, so anything below two is raised to two.
    pub fn ready_to_merge_threshold(&self) -> usize {
        self.approvals_before_ready_to_merge.max(2)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_approvals_before_ready_to_merge() -> usize {
    2
}

fn default_labels() -> Vec<String> {
    [
        "bug",
        "duplicate",
        "enhancement",
        "good first issue",
        "help wanted",
        "invalid",
        "question",
        "wontfix",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl AppConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Load from file if specified
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        } else {
            builder = builder.add_source(config::File::with_name("labelbot").required(false));
        }

        // Environment variable overrides with LABELBOT_ prefix. Values stay
        // strings so numeric-looking secrets keep their exact bytes.
        builder = builder.add_source(config::Environment::with_prefix("LABELBOT").separator("__"));

        let config: AppConfig = builder
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.github.webhook_secret.is_empty() {
            return Err(AppError::Config(
                "github.webhook_secret must not be empty".to_string(),
            ));
        }

        match (&self.github.private_key_path, &self.github.private_key) {
            (Some(_), Some(_)) => Err(AppError::Config(
                "set only one of github.private_key_path and github.private_key".to_string(),
            )),
            (None, None) => Err(AppError::Config(
                "one of github.private_key_path or github.private_key is required".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn webhook_secret(&self) -> &str {
        &self.github.webhook_secret
    }
}
