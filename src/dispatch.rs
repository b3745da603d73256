use crate::config::Config;
use crate::error::DispatchError;
use crate::github::{GitHubSource, RestGitHub};
use crate::orchestrator::{Orchestrator, RepoSummary};
use crate::render::{paths, ChromeEngine, IssueRenderer, PdfRenderer, RenderQueue};
use crate::types::{AccountType, FetchConfig, RepoRef, RepoSelection};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Which flow a [`FetchConfig`] selects. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    AllOrganizationRepos,
    AllUserRepos,
    MultipleRepos(&'a [String]),
    SingleRepo(&'a str),
}

pub fn route(cfg: &FetchConfig) -> Route<'_> {
    match (&cfg.account_type, &cfg.selection) {
        (AccountType::Organization, RepoSelection::All) => Route::AllOrganizationRepos,
        (AccountType::User, RepoSelection::All) => Route::AllUserRepos,
        (_, RepoSelection::Multiple(names)) => Route::MultipleRepos(names),
        (_, RepoSelection::One(name)) => Route::SingleRepo(name),
    }
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub repos: Vec<RepoSummary>,
}

impl RunSummary {
    pub fn rendered(&self) -> usize {
        self.repos
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|report| report.rendered())
            .sum()
    }

    pub fn render_failures(&self) -> usize {
        self.repos
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|report| report.failed())
            .sum()
    }

    pub fn fetch_failures(&self) -> usize {
        self.repos.iter().filter(|r| r.result.is_err()).count()
    }
}

pub struct Dispatcher {
    orchestrator: Orchestrator,
    output_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(orchestrator: Orchestrator, output_dir: PathBuf) -> Self {
        Self {
            orchestrator,
            output_dir,
        }
    }

    /// Wires the REST client, browser engine and render queue for one run.
    pub fn from_config(
        cfg: Arc<Config>,
        fetch: &FetchConfig,
        cancel: CancellationToken,
    ) -> Result<Self, DispatchError> {
        let source: Arc<dyn GitHubSource> =
            Arc::new(RestGitHub::new(cfg.clone(), fetch.token.as_str())?);
        let engine = ChromeEngine::locate(&cfg)?;
        debug!("using browser {}", engine.executable().display());
        let renderer: Arc<dyn IssueRenderer> = Arc::new(PdfRenderer::new(
            source.clone(),
            Arc::new(engine),
            cfg.output_dir.clone(),
            cfg.per_page,
        ));
        let orchestrator = Orchestrator::new(
            source,
            renderer,
            RenderQueue::new(cfg.concurrency),
            cfg.per_page,
            cancel,
        );
        Ok(Self::new(orchestrator, cfg.output_dir.clone()))
    }

    pub async fn dispatch(&self, fetch: &FetchConfig) -> Result<RunSummary, DispatchError> {
        let account_dir = paths::account_dir(&self.output_dir, &fetch.account);
        tokio::fs::create_dir_all(&account_dir)
            .await
            .map_err(|e| DispatchError::OutputDir {
                path: account_dir.clone(),
                source: e,
            })?;

        let selected = route(fetch);
        info!("Processing {} ({:?})", fetch.account, selected);
        let repos = match selected {
            Route::AllOrganizationRepos => {
                self.orchestrator
                    .process_all(&fetch.account, AccountType::Organization, fetch.year)
                    .await?
            }
            Route::AllUserRepos => {
                self.orchestrator
                    .process_all(&fetch.account, AccountType::User, fetch.year)
                    .await?
            }
            Route::MultipleRepos(names) => {
                self.orchestrator
                    .process_multiple(&fetch.account, names, fetch.year)
                    .await
            }
            Route::SingleRepo(name) => {
                let repo = RepoRef::new(fetch.account.as_str(), name);
                let result = self.orchestrator.process_repo(&repo, fetch.year).await;
                vec![RepoSummary { repo, result }]
            }
        };
        Ok(RunSummary { repos })
    }
}
