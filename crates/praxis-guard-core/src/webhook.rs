//! Webhook event parsing and dispatch.
//!
//! Turns a delivery (event name + JSON payload) into a [`WebhookEvent`] and
//! routes pull request events through the rule engine and the check-run
//! reporter. Transport and signature verification happen upstream.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info};

use crate::domain::{CheckContext, CheckRunId, Conclusion};
use crate::engine::RuleEngine;
use crate::error::{GuardError, GuardResult};
use crate::host::SourceHost;
use crate::reporter::CheckRunReporter;

/// Pull request actions that trigger a check.
pub const CHECK_TRIGGER_ACTIONS: [&str; 3] = ["opened", "synchronize", "reopened"];

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    name: String,
    full_name: String,
    owner: OwnerPayload,
}

#[derive(Debug, Deserialize)]
struct GitRefPayload {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: GitRefPayload,
    base: GitRefPayload,
}

#[derive(Debug, Deserialize)]
struct InstallationPayload {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct PullRequestDelivery {
    action: String,
    pull_request: PullRequestPayload,
    repository: RepositoryPayload,
    #[serde(default)]
    installation: Option<InstallationPayload>,
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    state: String,
}

#[derive(Debug, Deserialize)]
struct ReviewPullRequestPayload {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct ReviewDelivery {
    review: ReviewPayload,
    pull_request: ReviewPullRequestPayload,
    repository: RepositoryPayload,
}

#[derive(Debug, Deserialize)]
struct CheckSuitePayload {
    head_sha: String,
}

#[derive(Debug, Deserialize)]
struct CheckSuiteDelivery {
    check_suite: CheckSuitePayload,
    repository: RepositoryPayload,
}

/// A pull request event that should be checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: String,
    pub installation_id: Option<u64>,
    pub owner: String,
    pub repo: String,
    pub pull_number: u64,
    pub head_sha: String,
    pub base_sha: String,
}

impl PullRequestEvent {
    /// Check context, or `None` when the delivery carried no installation.
    pub fn context(&self) -> Option<CheckContext> {
        Some(CheckContext {
            installation_id: self.installation_id?,
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            pull_number: self.pull_number,
            head_sha: self.head_sha.clone(),
            base_sha: self.base_sha.clone(),
        })
    }
}

/// A parsed webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PullRequest(PullRequestEvent),
    PullRequestReview {
        full_name: String,
        pull_number: u64,
        state: String,
    },
    CheckSuite {
        full_name: String,
        head_sha: String,
    },
    Ignored {
        event: String,
        action: Option<String>,
    },
}

impl WebhookEvent {
    /// Parse a delivery from its `X-GitHub-Event` name and JSON body.
    pub fn parse(event: &str, payload: &[u8]) -> GuardResult<Self> {
        let value: Value = serde_json::from_slice(payload)?;
        let action = value
            .get("action")
            .and_then(Value::as_str)
            .map(str::to_string);

        let parsed = match (event, action.as_deref()) {
            ("pull_request", Some(a)) if CHECK_TRIGGER_ACTIONS.contains(&a) => {
                let d: PullRequestDelivery = from_value(value, event)?;
                WebhookEvent::PullRequest(PullRequestEvent {
                    action: d.action,
                    installation_id: d.installation.map(|i| i.id),
                    owner: d.repository.owner.login,
                    repo: d.repository.name,
                    pull_number: d.pull_request.number,
                    head_sha: d.pull_request.head.sha,
                    base_sha: d.pull_request.base.sha,
                })
            }
            ("pull_request_review", Some("submitted")) => {
                let d: ReviewDelivery = from_value(value, event)?;
                WebhookEvent::PullRequestReview {
                    full_name: d.repository.full_name,
                    pull_number: d.pull_request.number,
                    state: d.review.state,
                }
            }
            ("check_suite", Some("requested" | "rerequested")) => {
                let d: CheckSuiteDelivery = from_value(value, event)?;
                WebhookEvent::CheckSuite {
                    full_name: d.repository.full_name,
                    head_sha: d.check_suite.head_sha,
                }
            }
            _ => WebhookEvent::Ignored {
                event: event.to_string(),
                action,
            },
        };
        Ok(parsed)
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value, event: &str) -> GuardResult<T> {
    serde_json::from_value(value)
        .map_err(|e| GuardError::InvalidPayload(format!("{} event: {}", event, e)))
}

/// What dispatch did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A check run was created and completed.
    Completed {
        check_run_id: CheckRunId,
        conclusion: Conclusion,
    },
    /// Nothing to check.
    Skipped { reason: String },
}

/// Route `event`: pull request events are checked and reported, review and
/// check-suite events are logged only.
///
/// Once the check run exists it is always completed, with a `failure`
/// verdict if evaluation failed.
pub async fn dispatch(
    host: &dyn SourceHost,
    engine: &RuleEngine,
    event: &WebhookEvent,
) -> GuardResult<Dispatch> {
    match event {
        WebhookEvent::PullRequest(pr) => {
            info!(
                repo = %format!("{}/{}", pr.owner, pr.repo),
                pull_number = pr.pull_number,
                action = %pr.action,
                "processing pull request"
            );
            let Some(ctx) = pr.context() else {
                error!(pull_number = pr.pull_number, "no installation id on pull request event");
                return Ok(Dispatch::Skipped {
                    reason: "no installation id".to_string(),
                });
            };

            let reporter = CheckRunReporter::start(host, &ctx, &engine.config().check_name).await?;
            let result = engine.run(host, &ctx).await;
            reporter.complete(&result).await?;

            info!(
                pull_number = ctx.pull_number,
                conclusion = %result.conclusion,
                "completed checks for pull request"
            );
            Ok(Dispatch::Completed {
                check_run_id: reporter.id(),
                conclusion: result.conclusion,
            })
        }
        WebhookEvent::PullRequestReview {
            full_name,
            pull_number,
            state,
        } => {
            info!(repo = %full_name, pull_number, state = %state, "pull request review received");
            Ok(Dispatch::Skipped {
                reason: "review events do not trigger checks".to_string(),
            })
        }
        WebhookEvent::CheckSuite {
            full_name,
            head_sha,
        } => {
            info!(repo = %full_name, head_sha = %head_sha, "check suite requested");
            Ok(Dispatch::Skipped {
                reason: "checks run on pull request events".to_string(),
            })
        }
        WebhookEvent::Ignored { event, action } => {
            info!(event = %event, action = ?action, "ignoring webhook");
            Ok(Dispatch::Skipped {
                reason: format!("unhandled event {}", event),
            })
        }
    }
}
