pub mod chrome;
pub mod html;
pub mod paths;
pub mod queue;

pub use chrome::{ChromeEngine, PdfEngine, PrintSource};
pub use queue::{IssueResult, RenderQueue, RenderReport};

use crate::error::RenderError;
use crate::github::GitHubSource;
use crate::paginate;
use crate::types::IssueSummary;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Turns one issue into one PDF file and returns where it was written.
#[async_trait]
pub trait IssueRenderer: Send + Sync {
    async fn render(
        &self,
        issue: &IssueSummary,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, RenderError>;
}

/// Public issues are printed straight from github.com. Private ones are
/// assembled into a local HTML page together with their comments first.
pub struct PdfRenderer {
    source: Arc<dyn GitHubSource>,
    engine: Arc<dyn PdfEngine>,
    output_dir: PathBuf,
    per_page: u32,
}

impl PdfRenderer {
    pub fn new(
        source: Arc<dyn GitHubSource>,
        engine: Arc<dyn PdfEngine>,
        output_dir: PathBuf,
        per_page: u32,
    ) -> Self {
        Self {
            source,
            engine,
            output_dir,
            per_page,
        }
    }
}

#[async_trait]
impl IssueRenderer for PdfRenderer {
    async fn render(
        &self,
        issue: &IssueSummary,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, RenderError> {
        let out = paths::pdf_path(&self.output_dir, issue);
        if let Some(dir) = out.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| RenderError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })?;
        }

        let source = if issue.private {
            let comments =
                paginate::fetch_comments(self.source.as_ref(), issue, self.per_page, cancel)
                    .await?;
            PrintSource::Html(html::build_document(issue, &comments))
        } else {
            PrintSource::Url(issue.public_url())
        };
        self.engine.print(&source, &out, cancel).await?;
        Ok(out)
    }
}
