//! GitHub REST list endpoints used by the pipeline.
//!
//! Every list call returns one [`Page`]; walking pages to completion is the
//! job of [`crate::paginate::fetch_all`].

use crate::config::Config;
use crate::error::FetchError;
use crate::http::{self, encode_path_segment};
use crate::types::{AccountType, Comment, IssueSummary, Page, PageCursor, RepoRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

#[async_trait]
pub trait GitHubSource: Send + Sync {
    /// One page of `GET /repos/{owner}/{repo}/issues?state=all`.
    async fn list_issues(
        &self,
        repo: &RepoRef,
        private: bool,
        cursor: PageCursor,
    ) -> Result<Page<IssueSummary>, FetchError>;

    /// One page of the organization (public only) or user repository listing.
    async fn list_repos(
        &self,
        account: &str,
        account_type: AccountType,
        cursor: PageCursor,
    ) -> Result<Page<RepoRef>, FetchError>;

    async fn list_comments(
        &self,
        issue: &IssueSummary,
        cursor: PageCursor,
    ) -> Result<Page<Comment>, FetchError>;

    /// Whether the repository is private.
    async fn repo_is_private(&self, repo: &RepoRef) -> Result<bool, FetchError>;
}

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Deserialize)]
struct ApiLabel {
    name: String,
}

#[derive(Deserialize)]
struct ApiIssue {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    user: Option<ApiUser>,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiRepo {
    name: String,
    owner: ApiUser,
    #[serde(default)]
    private: bool,
}

#[derive(Deserialize)]
struct ApiComment {
    user: Option<ApiUser>,
    body: Option<String>,
    created_at: DateTime<Utc>,
}

/// [`GitHubSource`] backed by the REST API.
pub struct RestGitHub {
    client: Client,
    cfg: Arc<Config>,
    token: String,
}

impl RestGitHub {
    pub fn new(cfg: Arc<Config>, token: impl Into<String>) -> reqwest::Result<Self> {
        let client = http::build_client(&cfg)?;
        Ok(Self {
            client,
            cfg,
            token: token.into(),
        })
    }

    async fn get_page<R, T>(
        &self,
        target: &str,
        path: String,
        cursor: PageCursor,
        project: impl Fn(R) -> T + Send,
    ) -> Result<Page<T>, FetchError>
    where
        R: for<'de> Deserialize<'de> + Send,
        T: Send,
    {
        let sep = if path.contains('?') { '&' } else { '?' };
        let path = format!(
            "{}{}page={}&per_page={}",
            path, sep, cursor.page, cursor.per_page
        );
        let resp =
            http::rest_get_json::<Vec<R>>(&self.client, &self.cfg, &self.token, &path).await;
        let has_next = resp.has_next_page();
        let raw = resp.into_result().map_err(|info| FetchError::Api {
            target: target.to_string(),
            info,
        })?;
        Ok(Page {
            items: raw.into_iter().map(project).collect(),
            has_next,
        })
    }
}

#[async_trait]
impl GitHubSource for RestGitHub {
    async fn list_issues(
        &self,
        repo: &RepoRef,
        private: bool,
        cursor: PageCursor,
    ) -> Result<Page<IssueSummary>, FetchError> {
        let path = format!(
            "/repos/{}/{}/issues?state=all",
            encode_path_segment(&repo.owner),
            encode_path_segment(&repo.name)
        );
        self.get_page(&repo.to_string(), path, cursor, |i: ApiIssue| IssueSummary {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            number: i.number,
            title: i.title,
            body: i.body,
            labels: i.labels.into_iter().map(|l| l.name).collect(),
            author: i.user.map(|u| u.login),
            created_at: i.created_at,
            closed_at: i.closed_at,
            private,
        })
        .await
    }

    async fn list_repos(
        &self,
        account: &str,
        account_type: AccountType,
        cursor: PageCursor,
    ) -> Result<Page<RepoRef>, FetchError> {
        let path = match account_type {
            AccountType::Organization => {
                format!("/orgs/{}/repos?type=public", encode_path_segment(account))
            }
            AccountType::User => {
                format!("/users/{}/repos?type=owner", encode_path_segment(account))
            }
        };
        self.get_page(account, path, cursor, |r: ApiRepo| RepoRef {
            owner: r.owner.login,
            name: r.name,
            private: Some(r.private),
        })
        .await
    }

    async fn list_comments(
        &self,
        issue: &IssueSummary,
        cursor: PageCursor,
    ) -> Result<Page<Comment>, FetchError> {
        let path = format!(
            "/repos/{}/{}/issues/{}/comments",
            encode_path_segment(&issue.owner),
            encode_path_segment(&issue.repo),
            issue.number
        );
        let target = format!("{}/{}#{}", issue.owner, issue.repo, issue.number);
        self.get_page(&target, path, cursor, |c: ApiComment| Comment {
            author: c.user.map(|u| u.login),
            body: c.body,
            created_at: c.created_at,
        })
        .await
    }

    async fn repo_is_private(&self, repo: &RepoRef) -> Result<bool, FetchError> {
        let path = format!(
            "/repos/{}/{}",
            encode_path_segment(&repo.owner),
            encode_path_segment(&repo.name)
        );
        let resp =
            http::rest_get_json::<ApiRepo>(&self.client, &self.cfg, &self.token, &path).await;
        resp.into_result()
            .map(|r| r.private)
            .map_err(|info| FetchError::Api {
                target: repo.to_string(),
                info,
            })
    }
}
