#![allow(dead_code)]

use async_trait::async_trait;
use gh_issue_pdf::error::{FetchError, RenderError};
use gh_issue_pdf::github::GitHubSource;
use gh_issue_pdf::http::ErrorInfo;
use gh_issue_pdf::render::IssueRenderer;
use gh_issue_pdf::types::{AccountType, Comment, IssueSummary, Page, PageCursor, RepoRef};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};
use tokio_util::sync::CancellationToken;

pub type Events = Arc<Mutex<Vec<String>>>;

/// Process-wide logger that keeps every formatted record. Tests in one binary
/// share it, so assertions should look for lines naming their own repos.
struct CaptureLogger {
    lines: Mutex<Vec<String>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.lines
                .lock()
                .unwrap()
                .push(format!("{} {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    lines: Mutex::new(Vec::new()),
};
static INIT_LOGGER: Once = Once::new();

pub fn capture_logs() {
    INIT_LOGGER.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Info);
    });
}

/// Snapshot of every captured line so far.
pub fn logged() -> Vec<String> {
    LOGGER.lines.lock().unwrap().clone()
}

pub fn issue(
    owner: &str,
    repo: &str,
    number: u64,
    created: &str,
    closed: Option<&str>,
) -> IssueSummary {
    IssueSummary {
        owner: owner.into(),
        repo: repo.into(),
        number,
        title: format!("Issue {number}"),
        body: Some("body".into()),
        labels: vec![],
        author: Some("octocat".into()),
        created_at: created.parse().unwrap(),
        closed_at: closed.map(|c| c.parse().unwrap()),
        private: false,
    }
}

fn not_found(target: &str) -> FetchError {
    FetchError::Api {
        target: target.to_string(),
        info: ErrorInfo {
            code: "not_found".into(),
            message: "Not Found".into(),
            retriable: false,
        },
    }
}

fn page_of<T: Clone>(all: &[T], cursor: PageCursor) -> Page<T> {
    let per_page = cursor.per_page as usize;
    let start = ((cursor.page - 1) as usize * per_page).min(all.len());
    let end = (start + per_page).min(all.len());
    Page {
        items: all[start..end].to_vec(),
        has_next: end < all.len(),
    }
}

/// In-memory GitHub that records every call in `events`.
#[derive(Default)]
pub struct FakeGitHub {
    pub events: Events,
    pub issues: HashMap<String, Vec<IssueSummary>>,
    pub repos: HashMap<String, Vec<RepoRef>>,
    pub comments: Vec<Comment>,
    pub private_repos: HashSet<String>,
}

impl FakeGitHub {
    pub fn with_events(events: Events) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn add_repo_issues(&mut self, owner: &str, repo: &str, issues: Vec<IssueSummary>) {
        self.issues.insert(format!("{owner}/{repo}"), issues);
    }

    fn log(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl GitHubSource for FakeGitHub {
    async fn list_issues(
        &self,
        repo: &RepoRef,
        private: bool,
        cursor: PageCursor,
    ) -> Result<Page<IssueSummary>, FetchError> {
        let key = repo.to_string();
        self.log(format!("issues {} p{}", key, cursor.page));
        tokio::task::yield_now().await;
        let all = self.issues.get(&key).ok_or_else(|| not_found(&key))?;
        let mut page = page_of(all, cursor);
        for i in &mut page.items {
            i.private = private;
        }
        Ok(page)
    }

    async fn list_repos(
        &self,
        account: &str,
        account_type: AccountType,
        cursor: PageCursor,
    ) -> Result<Page<RepoRef>, FetchError> {
        self.log(format!("repos {} {} p{}", account_type, account, cursor.page));
        let all = self.repos.get(account).ok_or_else(|| not_found(account))?;
        Ok(page_of(all, cursor))
    }

    async fn list_comments(
        &self,
        issue: &IssueSummary,
        cursor: PageCursor,
    ) -> Result<Page<Comment>, FetchError> {
        self.log(format!(
            "comments {}/{}#{} p{}",
            issue.owner, issue.repo, issue.number, cursor.page
        ));
        Ok(page_of(&self.comments, cursor))
    }

    async fn repo_is_private(&self, repo: &RepoRef) -> Result<bool, FetchError> {
        let key = repo.to_string();
        self.log(format!("lookup {}", key));
        if !self.issues.contains_key(&key) {
            return Err(not_found(&key));
        }
        Ok(self.private_repos.contains(&key))
    }
}

/// Renderer that records each render and fails the issue numbers in `fail`.
#[derive(Default)]
pub struct RecordingRenderer {
    pub events: Events,
    pub fail: HashSet<u64>,
}

impl RecordingRenderer {
    pub fn with_events(events: Events) -> Self {
        Self {
            events,
            fail: HashSet::new(),
        }
    }
}

#[async_trait]
impl IssueRenderer for RecordingRenderer {
    async fn render(
        &self,
        issue: &IssueSummary,
        _cancel: &CancellationToken,
    ) -> Result<PathBuf, RenderError> {
        self.events.lock().unwrap().push(format!(
            "render {}/{}#{}",
            issue.owner, issue.repo, issue.number
        ));
        tokio::task::yield_now().await;
        if self.fail.contains(&issue.number) {
            return Err(RenderError::Browser {
                status: "exit status: 1".into(),
                stderr: "boom".into(),
            });
        }
        Ok(PathBuf::from(format!("{}.pdf", issue.number)))
    }
}
