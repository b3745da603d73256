use chrono::{DateTime, Utc};
use std::fmt;

/// One issue as projected from an issue-listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<String>,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub private: bool,
}

impl IssueSummary {
    pub fn public_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/issues/{}",
            self.owner, self.repo, self.number
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: Option<String>,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A repository to process. `private` is `None` when the repo name came from
/// user input and its visibility has not been looked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    pub private: Option<bool>,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            private: None,
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Position inside one pagination walk. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub per_page: u32,
}

impl PageCursor {
    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            per_page: self.per_page,
        }
    }
}

/// One page of a list endpoint plus whether the upstream advertised a `next` relation.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Organization,
    User,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Organization => f.write_str("organization"),
            AccountType::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSelection {
    One(String),
    Multiple(Vec<String>),
    All,
}

/// Everything one run needs, as collected by the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub account: String,
    pub account_type: AccountType,
    pub selection: RepoSelection,
    pub year: Option<i32>,
    pub token: String,
}
