use crate::types::IssueSummary;
use std::path::{Path, PathBuf};

/// `<YYYY-MM-DD>.#<NNNN>.pdf`, dated by issue creation.
pub fn pdf_file_name(issue: &IssueSummary) -> String {
    format!(
        "{}.#{:04}.pdf",
        issue.created_at.format("%Y-%m-%d"),
        issue.number
    )
}

pub fn pdf_path(root: &Path, issue: &IssueSummary) -> PathBuf {
    root.join(&issue.owner)
        .join(&issue.repo)
        .join(pdf_file_name(issue))
}

pub fn account_dir(root: &Path, account: &str) -> PathBuf {
    root.join(account)
}
