//! Fetch → filter → render sequencing for one repository or a list of them.

use crate::error::FetchError;
use crate::filter::filter_by_year;
use crate::github::GitHubSource;
use crate::paginate;
use crate::render::{IssueRenderer, RenderQueue, RenderReport};
use crate::types::{AccountType, RepoRef};
use log::{error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Cancellation is expected after Ctrl-C and is not blamed on the names entered.
fn report_failure(action: &str, err: &FetchError) {
    match err {
        FetchError::Cancelled(_) => warn!("Cancelled; did not {}", action),
        FetchError::Api { .. } => error!(
            "Could not {}: {}. Check the account and repository names.",
            action, err
        ),
    }
}

#[derive(Debug)]
pub struct RepoSummary {
    pub repo: RepoRef,
    pub result: Result<RenderReport, FetchError>,
}

pub struct Orchestrator {
    source: Arc<dyn GitHubSource>,
    renderer: Arc<dyn IssueRenderer>,
    queue: RenderQueue,
    per_page: u32,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn GitHubSource>,
        renderer: Arc<dyn IssueRenderer>,
        queue: RenderQueue,
        per_page: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            renderer,
            queue,
            per_page,
            cancel,
        }
    }

    /// Collects every issue of `repo` (optionally only those open during
    /// `year`), then renders them. Rendering starts only after the whole
    /// issue list has been fetched.
    pub async fn process_repo(
        &self,
        repo: &RepoRef,
        year: Option<i32>,
    ) -> Result<RenderReport, FetchError> {
        let private = match repo.private {
            Some(p) => p,
            None => self
                .source
                .repo_is_private(repo)
                .await
                .inspect_err(|e| report_failure(&format!("look up repository {}", repo), e))?,
        };

        let issues = paginate::fetch_issues(
            self.source.as_ref(),
            repo,
            private,
            self.per_page,
            &self.cancel,
        )
        .await
        .inspect_err(|e| report_failure(&format!("fetch issues for {}", repo), e))?;

        let issues = match year {
            Some(y) => filter_by_year(&issues, y),
            None => issues,
        };
        info!("Fetching {} issue(s) from {}", issues.len(), repo);

        Ok(self
            .queue
            .run(repo, issues, self.renderer.as_ref(), &self.cancel)
            .await)
    }

    /// Processes `repos` strictly one after another: the next repository's
    /// fetch starts only after the previous render queue has drained. A
    /// repository that fails to fetch is recorded and skipped.
    pub async fn process_each(
        &self,
        repos: Vec<RepoRef>,
        year: Option<i32>,
    ) -> Vec<RepoSummary> {
        let mut summaries = Vec::with_capacity(repos.len());
        for repo in repos {
            if self.cancel.is_cancelled() {
                warn!("Cancelled; skipping {} and the remaining repositories", repo);
                break;
            }
            let result = self.process_repo(&repo, year).await;
            summaries.push(RepoSummary { repo, result });
        }
        info!("All done: processed {} repositories", summaries.len());
        summaries
    }

    /// Lists every repository of `account` and processes each in turn.
    pub async fn process_all(
        &self,
        account: &str,
        account_type: AccountType,
        year: Option<i32>,
    ) -> Result<Vec<RepoSummary>, FetchError> {
        let repos = paginate::fetch_repos(
            self.source.as_ref(),
            account,
            account_type,
            self.per_page,
            &self.cancel,
        )
        .await
        .inspect_err(|e| {
            report_failure(
                &format!("list repositories for {} {}", account_type, account),
                e,
            )
        })?;
        info!("Found {} repositories for {}", repos.len(), account);
        Ok(self.process_each(repos, year).await)
    }

    pub async fn process_multiple(
        &self,
        account: &str,
        names: &[String],
        year: Option<i32>,
    ) -> Vec<RepoSummary> {
        let repos = names
            .iter()
            .map(|name| RepoRef::new(account, name.as_str()))
            .collect();
        self.process_each(repos, year).await
    }
}
