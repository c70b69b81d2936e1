//! In-memory [`Platform`] used by the workflow and webhook tests.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

/// A recorded mutating or listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLabels(String),
    CreateLabel(String, String),
    UpdateLabelColor(String, String),
    DeleteLabel(String),
    AddLabels(u64, Vec<String>),
    RemoveLabel(u64, String),
    ListReviews(u64),
    ListOrgRepos(String, u32),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateLabel(..)
                | Call::UpdateLabelColor(..)
                | Call::DeleteLabel(..)
                | Call::AddLabels(..)
                | Call::RemoveLabel(..)
        )
    }
}

#[derive(Default)]
struct State {
    /// repo -> label name -> color
    repo_labels: BTreeMap<String, BTreeMap<String, String>>,
    /// issue number -> attached labels
    issue_labels: BTreeMap<u64, BTreeSet<String>>,
    reviews: BTreeMap<u64, Vec<Review>>,
    /// org -> pages of repositories
    org_pages: BTreeMap<String, Vec<Vec<OrgRepo>>>,
    calls: Vec<Call>,
    fail_auth: HashSet<u64>,
    fail_add: bool,
    fail_list_reviews: bool,
    fail_list_labels_for: HashSet<String>,
}

#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<State>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn authenticate(state: &State, installation_id: u64) -> Result<()> {
        if state.fail_auth.contains(&installation_id) {
            return Err(AppError::Auth(format!(
                "installation {installation_id} is not authorized"
            )));
        }
        Ok(())
    }

    pub fn set_repo_labels(&self, repo: &str, labels: &[(&str, &str)]) {
        self.with_state(|s| {
            s.repo_labels.insert(
                repo.to_string(),
                labels
                    .iter()
                    .map(|(name, color)| (name.to_string(), color.to_string()))
                    .collect(),
            );
        });
    }

    pub fn repo_labels(&self, repo: &str) -> BTreeMap<String, String> {
        self.with_state(|s| s.repo_labels.get(repo).cloned().unwrap_or_default())
    }

    pub fn set_issue_labels(&self, number: u64, labels: &[&str]) {
        self.with_state(|s| {
            s.issue_labels
                .insert(number, labels.iter().map(|l| l.to_string()).collect());
        });
    }

    pub fn issue_labels(&self, number: u64) -> BTreeSet<String> {
        self.with_state(|s| s.issue_labels.get(&number).cloned().unwrap_or_default())
    }

    pub fn set_reviews(&self, number: u64, reviews: Vec<Review>) {
        self.with_state(|s| {
            s.reviews.insert(number, reviews);
        });
    }

    pub fn set_org_pages(&self, org: &str, pages: Vec<Vec<OrgRepo>>) {
        self.with_state(|s| {
            s.org_pages.insert(org.to_string(), pages);
        });
    }

    pub fn fail_auth_for(&self, installation_id: u64) {
        self.with_state(|s| {
            s.fail_auth.insert(installation_id);
        });
    }

    pub fn fail_add_labels(&self) {
        self.with_state(|s| s.fail_add = true);
    }

    pub fn fail_list_reviews(&self) {
        self.with_state(|s| s.fail_list_reviews = true);
    }

    pub fn fail_list_labels_for(&self, repo: &str) {
        self.with_state(|s| {
            s.fail_list_labels_for.insert(repo.to_string());
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with_state(|s| s.calls.clear());
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn get_access_token(&self, installation_id: u64) -> Result<String> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            Ok(format!("token-{installation_id}"))
        })
    }

    async fn list_labels(
        &self,
        installation_id: u64,
        _owner: &str,
        repo: &str,
    ) -> Result<Vec<Label>> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::ListLabels(repo.to_string()));
            if s.fail_list_labels_for.contains(repo) {
                return Err(AppError::GitHubApi(format!("cannot list labels of {repo}")));
            }
            Ok(s.repo_labels
                .get(repo)
                .map(|labels| {
                    labels
                        .iter()
                        .map(|(name, color)| Label {
                            name: name.clone(),
                            color: color.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    async fn create_label(
        &self,
        installation_id: u64,
        _owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls
                .push(Call::CreateLabel(name.to_string(), color.to_string()));
            let labels = s.repo_labels.entry(repo.to_string()).or_default();
            // GitHub answers 422 for a name that exists in any letter case
            if labels.keys().any(|existing| existing.eq_ignore_ascii_case(name)) {
                return Err(AppError::GitHubApi(format!("label {name} already exists")));
            }
            labels.insert(name.to_string(), color.to_string());
            Ok(())
        })
    }

    async fn update_label_color(
        &self,
        installation_id: u64,
        _owner: &str,
        repo: &str,
        name: &str,
        color: &str,
    ) -> Result<()> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls
                .push(Call::UpdateLabelColor(name.to_string(), color.to_string()));
            match s.repo_labels.get_mut(repo).and_then(|l| l.get_mut(name)) {
                Some(existing) => {
                    *existing = color.to_string();
                    Ok(())
                }
                None => Err(AppError::GitHubApi(format!("label {name} not found"))),
            }
        })
    }

    async fn delete_label(
        &self,
        installation_id: u64,
        _owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<()> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::DeleteLabel(name.to_string()));
            s.repo_labels
                .get_mut(repo)
                .and_then(|l| l.remove(name))
                .map(drop)
                .ok_or_else(|| AppError::GitHubApi(format!("label {name} not found")))
        })
    }

    async fn add_labels(
        &self,
        installation_id: u64,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::AddLabels(issue_number, labels.to_vec()));
            if s.fail_add {
                return Err(AppError::GitHubApi("add labels rejected".to_string()));
            }
            s.issue_labels
                .entry(issue_number)
                .or_default()
                .extend(labels.iter().cloned());
            Ok(())
        })
    }

    async fn remove_label(
        &self,
        installation_id: u64,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        label: &str,
    ) -> Result<()> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::RemoveLabel(issue_number, label.to_string()));
            // GitHub answers 404 when the label is not attached
            let removed = s
                .issue_labels
                .get_mut(&issue_number)
                .map_or(false, |labels| labels.remove(label));
            if removed {
                Ok(())
            } else {
                Err(AppError::GitHubApi(format!("Label does not exist: {label}")))
            }
        })
    }

    async fn list_reviews(
        &self,
        installation_id: u64,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> Result<Vec<Review>> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::ListReviews(pr_number));
            if s.fail_list_reviews {
                return Err(AppError::GitHubApi("reviews unavailable".to_string()));
            }
            Ok(s.reviews.get(&pr_number).cloned().unwrap_or_default())
        })
    }

    async fn list_org_repos(
        &self,
        installation_id: u64,
        org: &str,
        page: u32,
        _per_page: u8,
    ) -> Result<RepoPage> {
        self.with_state(|s| {
            Self::authenticate(s, installation_id)?;
            s.calls.push(Call::ListOrgRepos(org.to_string(), page));
            let pages = s.org_pages.get(org).cloned().unwrap_or_default();
            let index = page.saturating_sub(1) as usize;
            Ok(RepoPage {
                repos: pages.get(index).cloned().unwrap_or_default(),
                has_next: index + 1 < pages.len(),
            })
        })
    }
}
