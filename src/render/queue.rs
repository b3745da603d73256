use super::IssueRenderer;
use crate::config::DEFAULT_CONCURRENCY;
use crate::error::RenderError;
use crate::types::{IssueSummary, RepoRef};
use futures::stream::{self, StreamExt};
use log::{error, info};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct IssueResult {
    pub number: u64,
    pub outcome: Result<PathBuf, RenderError>,
}

/// Per-issue outcomes of one queue run, in completion order.
#[derive(Debug)]
pub struct RenderReport {
    pub repo: String,
    pub results: Vec<IssueResult>,
}

impl RenderReport {
    pub fn rendered(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.rendered()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Renders a batch of issues with at most `concurrency` renders in flight.
#[derive(Debug, Clone, Copy)]
pub struct RenderQueue {
    concurrency: usize,
}

impl Default for RenderQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl RenderQueue {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every issue through `renderer`. A failed render is recorded in the
    /// report and never stops its siblings. Resolves once all renders settle.
    pub async fn run(
        &self,
        repo: &RepoRef,
        issues: Vec<IssueSummary>,
        renderer: &dyn IssueRenderer,
        cancel: &CancellationToken,
    ) -> RenderReport {
        let label = repo.to_string();
        if issues.is_empty() {
            info!("No issues found for {}", label);
            return RenderReport {
                repo: label,
                results: Vec::new(),
            };
        }

        let results: Vec<IssueResult> = stream::iter(issues)
            .map(|issue| async move {
                let outcome = if cancel.is_cancelled() {
                    Err(RenderError::Cancelled)
                } else {
                    renderer.render(&issue, cancel).await
                };
                if let Err(e) = &outcome {
                    error!(
                        "Failed to render {}/{}#{}: {}",
                        issue.owner, issue.repo, issue.number, e
                    );
                }
                IssueResult {
                    number: issue.number,
                    outcome,
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let report = RenderReport {
            repo: label,
            results,
        };
        if report.is_success() {
            info!(
                "Finished rendering {} issue(s) for {}",
                report.rendered(),
                report.repo
            );
        } else {
            error!(
                "{} of {} issue(s) failed to render for {}",
                report.failed(),
                report.results.len(),
                report.repo
            );
        }
        report
    }
}
