use crate::error::Result;
use crate::labels::{self, LabelPlan};
use crate::platform::Platform;
use crate::workflow::types::PullRequestTarget;

/// Push a label plan to the platform.
///
/// A failed addition is an error. Removals are best effort: the platform
/// rejects removing a label that is not attached, which is the common case.
pub async fn apply_plan(
    platform: &dyn Platform,
    target: &PullRequestTarget,
    plan: &LabelPlan,
) -> Result<()> {
    if let Some(label) = plan.add {
        if let Err(e) = platform
            .add_labels(
                target.installation_id,
                &target.owner,
                &target.repo,
                target.number,
                &[label.name().to_string()],
            )
            .await
        {
            tracing::error!(pr = %target, label = %label, error = %e, "Could not add label");
            return Err(e);
        }
        tracing::info!(pr = %target, label = %label, "Added label");
    }

    for label in &plan.remove {
        match platform
            .remove_label(
                target.installation_id,
                &target.owner,
                &target.repo,
                target.number,
                label.name(),
            )
            .await
        {
            Ok(()) => tracing::info!(pr = %target, label = %label, "Removed label"),
            Err(e) => tracing::debug!(
                pr = %target,
                label = %label,
                error = %e,
                "Could not remove label, it is probably not attached"
            ),
        }
    }

    Ok(())
}

/// Give a newly opened pull request its first lifecycle label.
pub async fn label_opened(
    platform: &dyn Platform,
    target: &PullRequestTarget,
    draft: bool,
    has_labels: bool,
) -> Result<LabelPlan> {
    let plan = labels::plan_for_opened(draft, has_labels);
    if plan.is_empty() {
        tracing::debug!(pr = %target, "Pull request already labelled, leaving it alone");
        return Ok(plan);
    }

    apply_plan(platform, target, &plan).await?;
    Ok(plan)
}

pub async fn label_ready_for_review(
    platform: &dyn Platform,
    target: &PullRequestTarget,
) -> Result<LabelPlan> {
    let plan = labels::plan_for_ready_for_review();
    apply_plan(platform, target, &plan).await?;
    Ok(plan)
}

/// Recount distinct approvers and move the pull request to the matching label.
/// Returns the approver count.
pub async fn label_reviewed(
    platform: &dyn Platform,
    target: &PullRequestTarget,
    ready_to_merge_threshold: usize,
) -> Result<usize> {
    let reviews = platform
        .list_reviews(
            target.installation_id,
            &target.owner,
            &target.repo,
            target.number,
        )
        .await?;

    let approvers = labels::count_distinct_approvers(&reviews);
    tracing::info!(
        pr = %target,
        reviews = reviews.len(),
        approvers,
        "Counted approving reviewers"
    );

    let plan = labels::plan_for_approvals(approvers, ready_to_merge_threshold);
    apply_plan(platform, target, &plan).await?;

    Ok(approvers)
}
