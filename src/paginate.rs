//! Walks a page-numbered list endpoint to completion.

use crate::error::FetchError;
use crate::github::GitHubSource;
use crate::types::{AccountType, Comment, IssueSummary, Page, PageCursor, RepoRef};
use log::debug;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Requests pages 1, 2, 3, ... strictly in order, appending each page's items
/// to one accumulator, until a page arrives without a `next` relation.
///
/// The first failing page aborts the walk; nothing collected so far is returned.
pub async fn fetch_all<T, F, Fut>(
    target: &str,
    per_page: u32,
    cancel: &CancellationToken,
    mut list_page: F,
) -> Result<Vec<T>, FetchError>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut cursor = PageCursor::first(per_page);
    let mut acc = Vec::new();
    loop {
        let page = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled(target.to_string())),
            page = list_page(cursor) => page?,
        };
        debug!(
            "{}: page {} returned {} item(s), has_next={}",
            target,
            cursor.page,
            page.items.len(),
            page.has_next
        );
        acc.extend(page.items);
        if !page.has_next {
            return Ok(acc);
        }
        cursor = cursor.next();
    }
}

pub async fn fetch_issues(
    source: &dyn GitHubSource,
    repo: &RepoRef,
    private: bool,
    per_page: u32,
    cancel: &CancellationToken,
) -> Result<Vec<IssueSummary>, FetchError> {
    fetch_all(&repo.to_string(), per_page, cancel, |cursor| {
        source.list_issues(repo, private, cursor)
    })
    .await
}

pub async fn fetch_repos(
    source: &dyn GitHubSource,
    account: &str,
    account_type: AccountType,
    per_page: u32,
    cancel: &CancellationToken,
) -> Result<Vec<RepoRef>, FetchError> {
    fetch_all(account, per_page, cancel, |cursor| {
        source.list_repos(account, account_type, cursor)
    })
    .await
}

pub async fn fetch_comments(
    source: &dyn GitHubSource,
    issue: &IssueSummary,
    per_page: u32,
    cancel: &CancellationToken,
) -> Result<Vec<Comment>, FetchError> {
    let target = format!("{}/{}#{}", issue.owner, issue.repo, issue.number);
    fetch_all(&target, per_page, cancel, |cursor| {
        source.list_comments(issue, cursor)
    })
    .await
}
