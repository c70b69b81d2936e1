use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::server::AppState;
use crate::webhook::events::{
    InstallationEvent, InstallationPayload, PullRequestEvent, PullRequestReviewEvent,
    RepositoryEvent, RepositoryPayload, WebhookEvent,
};
use crate::webhook::signature::{verify_signature, SignatureHeader};
use crate::workflow::provision::{ensure_repository_labels, spawn_organization_sweep};
use crate::workflow::pull_request::{label_opened, label_ready_for_review, label_reviewed};
use crate::workflow::types::PullRequestTarget;

pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = match signature_header(&headers) {
        Some(sig) => sig,
        None => {
            tracing::warn!("Missing X-Hub-Signature-256 header");
            return StatusCode::BAD_REQUEST;
        }
    };

    if let Err(e) = verify_signature(state.config.webhook_secret(), &body, signature) {
        tracing::warn!(error = %e, "Invalid signature");
        return StatusCode::BAD_REQUEST;
    }

    let event_type = match headers.get("x-github-event").and_then(|v| v.to_str().ok()) {
        Some(et) => et.to_string(),
        None => {
            tracing::warn!("Missing X-GitHub-Event header");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event = match WebhookEvent::parse(&event_type, &body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, event_type = %event_type, "Cannot parse webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::debug!(event_type = %event_type, "Received webhook event");

    match event {
        WebhookEvent::Installation(event) => handle_installation_event(&state, event),
        WebhookEvent::PullRequest(event) => handle_pull_request_event(&state, event).await,
        WebhookEvent::PullRequestReview(event) => handle_review_event(&state, event).await,
        WebhookEvent::Repository(event) => handle_repository_event(&state, event).await,
        WebhookEvent::Ping => {
            tracing::info!("Received ping event");
            StatusCode::OK
        }
        WebhookEvent::Unsupported(event_type) => {
            tracing::debug!(event_type = %event_type, "Skipping event");
            StatusCode::OK
        }
    }
}

/// Prefer the SHA-256 signature; fall back to the legacy SHA-1 header.
fn signature_header(headers: &HeaderMap) -> Option<SignatureHeader<'_>> {
    if let Some(sig) = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok())
    {
        return Some(SignatureHeader::Sha256(sig));
    }

    headers
        .get("x-hub-signature")
        .and_then(|v| v.to_str().ok())
        .map(SignatureHeader::Sha1)
}

fn target_for(
    installation: Option<&InstallationPayload>,
    repository: &RepositoryPayload,
    number: u64,
) -> Option<PullRequestTarget> {
    Some(PullRequestTarget {
        installation_id: installation?.id,
        owner: repository.owner.login.clone(),
        repo: repository.name.clone(),
        number,
    })
}

fn handle_installation_event(state: &Arc<AppState>, event: InstallationEvent) -> StatusCode {
    let org = event.installation.account.login;
    tracing::info!(
        action = %event.action,
        account = %org,
        installation_id = event.installation.id,
        "Installation event"
    );

    if event.action == "created" {
        // Detached: the response must not wait for a full organization scan
        spawn_organization_sweep(
            Arc::clone(&state.platform),
            event.installation.id,
            org,
            state.config.labels.clone(),
        );
    }

    StatusCode::OK
}

async fn handle_pull_request_event(state: &AppState, event: PullRequestEvent) -> StatusCode {
    if event.action != "opened" && event.action != "ready_for_review" {
        return StatusCode::OK;
    }

    let target = match target_for(
        event.installation.as_ref(),
        &event.repository,
        event.pull_request.number,
    ) {
        Some(target) => target,
        None => {
            tracing::warn!("No installation ID in pull_request event");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        pr = %target,
        action = %event.action,
        url = event.pull_request.html_url.as_deref().unwrap_or_default(),
        "Pull request event"
    );

    let result = if event.action == "opened" {
        label_opened(
            state.platform.as_ref(),
            &target,
            event.pull_request.draft,
            !event.pull_request.labels.is_empty(),
        )
        .await
    } else {
        label_ready_for_review(state.platform.as_ref(), &target).await
    };

    match result {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(pr = %target, error = %e, "Cannot handle pull request event");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn handle_review_event(state: &AppState, event: PullRequestReviewEvent) -> StatusCode {
    // A plain comment review cannot change who approved
    let relevant = match event.action.as_str() {
        "submitted" => !event.review.state.eq_ignore_ascii_case("commented"),
        "dismissed" => true,
        _ => false,
    };
    if !relevant {
        return StatusCode::OK;
    }

    let target = match target_for(
        event.installation.as_ref(),
        &event.repository,
        event.pull_request.number,
    ) {
        Some(target) => target,
        None => {
            tracing::warn!("No installation ID in pull_request_review event");
            return StatusCode::BAD_REQUEST;
        }
    };

    tracing::info!(
        pr = %target,
        action = %event.action,
        review_id = event.review.id,
        reviewer = event.review.user.as_ref().map(|u| u.login.as_str()).unwrap_or("unknown"),
        state = %event.review.state,
        "Pull request review event"
    );

    match label_reviewed(
        state.platform.as_ref(),
        &target,
        state.config.labels.ready_to_merge_threshold(),
    )
    .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(pr = %target, error = %e, "Cannot handle pull request review event");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn handle_repository_event(state: &AppState, event: RepositoryEvent) -> StatusCode {
    if event.action != "created" {
        return StatusCode::OK;
    }

    let installation_id = match event.installation.as_ref() {
        Some(inst) => inst.id,
        None => {
            tracing::warn!("No installation ID in repository event");
            return StatusCode::BAD_REQUEST;
        }
    };

    let repo = &event.repository;
    match ensure_repository_labels(
        state.platform.as_ref(),
        installation_id,
        &repo.owner.login,
        &repo.name,
        &state.config.labels,
    )
    .await
    {
        Ok(report) => {
            tracing::info!(
                repo = %repo.full_name,
                created = report.created.len(),
                recolored = report.recolored.len(),
                deleted = report.deleted.len(),
                "Provisioned labels for new repository"
            );
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(repo = %repo.full_name, error = %e, "Cannot handle repository created event");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
