use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::LabelConfig;
use crate::error::Result;
use crate::labels::ManagedLabel;
use crate::platform::types::Label;
use crate::platform::Platform;
use crate::workflow::types::{ProvisionReport, SweepReport};

const REPOS_PER_PAGE: u8 = 50;

/// Make sure every managed label exists on `owner/repo` with its canonical
/// color. For the configured cleanup organization, GitHub's default labels
/// are deleted first.
///
/// Running this on an already provisioned repository only lists labels.
pub async fn ensure_repository_labels(
    platform: &dyn Platform,
    installation_id: u64,
    owner: &str,
    repo: &str,
    config: &LabelConfig,
) -> Result<ProvisionReport> {
    let existing = platform.list_labels(installation_id, owner, repo).await?;
    let mut report = ProvisionReport::default();

    // GitHub label names are case-insensitive
    let mut by_name: HashMap<String, &Label> = existing
        .iter()
        .map(|l| (l.name.to_lowercase(), l))
        .collect();

    if config.cleans_up(owner) {
        for label in &existing {
            if !config
                .default_labels
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&label.name))
            {
                continue;
            }

            tracing::info!(repo = %format!("{owner}/{repo}"), label = %label.name, "Deleting default label");
            platform
                .delete_label(installation_id, owner, repo, &label.name)
                .await
                .map_err(|e| {
                    tracing::error!(label = %label.name, error = %e, "Could not delete label");
                    e
                })?;
            by_name.remove(&label.name.to_lowercase());
            report.deleted.push(label.name.clone());
        }
    }

    for label in ManagedLabel::ALL {
        match by_name.get(label.name()) {
            Some(current) if current.color.eq_ignore_ascii_case(label.color()) => {}
            Some(current) => {
                tracing::info!(
                    repo = %format!("{owner}/{repo}"),
                    label = %current.name,
                    from = %current.color,
                    to = %label.color(),
                    "Label has the wrong color, changing"
                );
                platform
                    .update_label_color(installation_id, owner, repo, &current.name, label.color())
                    .await?;
                report.recolored.push(current.name.clone());
            }
            None => {
                tracing::info!(repo = %format!("{owner}/{repo}"), label = %label, "Label does not exist, creating");
                platform
                    .create_label(installation_id, owner, repo, label.name(), label.color())
                    .await?;
                report.created.push(label.name().to_string());
            }
        }
    }

    Ok(report)
}

/// Provision every non-archived repository of an organization, page by page.
/// Stops at the first repository that fails.
pub async fn sweep_organization(
    platform: &dyn Platform,
    installation_id: u64,
    org: &str,
    config: &LabelConfig,
) -> Result<SweepReport> {
    // Fail fast when the installation cannot authenticate at all
    platform.get_access_token(installation_id).await?;

    let mut report = SweepReport::default();
    let mut page = 1u32;

    loop {
        tracing::info!(org, page, "Listing repositories");
        let listing = platform
            .list_org_repos(installation_id, org, page, REPOS_PER_PAGE)
            .await?;
        report.pages += 1;

        for repo in &listing.repos {
            if repo.archived {
                tracing::debug!(org, repo = %repo.name, "Skipping archived repository");
                report.skipped += 1;
                continue;
            }

            ensure_repository_labels(platform, installation_id, org, &repo.name, config).await?;
            report.provisioned += 1;
        }

        if !listing.has_next {
            break;
        }
        page += 1;
    }

    Ok(report)
}

/// Run [`sweep_organization`] on a detached task. Failures are logged, never
/// returned to the caller.
pub fn spawn_organization_sweep(
    platform: Arc<dyn Platform>,
    installation_id: u64,
    org: String,
    config: LabelConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match sweep_organization(platform.as_ref(), installation_id, &org, &config).await {
            Ok(report) => tracing::info!(
                org = %org,
                installation_id,
                pages = report.pages,
                provisioned = report.provisioned,
                skipped = report.skipped,
                "Organization label sweep complete"
            ),
            Err(e) => tracing::error!(
                org = %org,
                installation_id,
                error = %e,
                "Organization label sweep failed"
            ),
        }
    })
}
