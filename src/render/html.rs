//! Standalone HTML document for issues whose GitHub page is not publicly reachable.

use crate::types::{Comment, IssueSummary};
use chrono::{DateTime, Utc};
use comrak::{markdown_to_html, Options};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; color: #1f2328; margin: 32px; }
h1 { font-size: 24px; font-weight: 400; margin-bottom: 4px; }
h1 .number { color: #59636e; }
.meta { color: #59636e; font-size: 13px; margin-bottom: 16px; }
.label { display: inline-block; border: 1px solid #d1d9e0; border-radius: 12px; padding: 0 8px; margin-right: 4px; font-size: 12px; }
.entry { border: 1px solid #d1d9e0; border-radius: 6px; margin: 16px 0; }
.entry header { background: #f6f8fa; border-bottom: 1px solid #d1d9e0; padding: 8px 16px; font-size: 13px; }
.entry .body { padding: 16px; word-wrap: break-word; font-size: 14px; }
.entry .body pre { background: #f6f8fa; border-radius: 6px; padding: 12px; overflow-x: auto; white-space: pre-wrap; }
.entry .body code { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 12px; }
.entry .body table { border-collapse: collapse; }
.entry .body td, .entry .body th { border: 1px solid #d1d9e0; padding: 4px 8px; }
.entry .body blockquote { color: #59636e; border-left: 4px solid #d1d9e0; margin: 0; padding: 0 12px; }
"#;

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// GitHub-flavoured markdown to HTML. Raw HTML in the source is not passed through.
pub fn render_markdown(raw: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.tagfilter = true;
    options.extension.footnotes = true;
    options.render.hardbreaks = true;
    options.render.unsafe_ = false;
    markdown_to_html(raw, &options)
}

fn fmt_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}

fn push_entry(doc: &mut String, author: Option<&str>, at: &DateTime<Utc>, body: Option<&str>) {
    let author = escape_html(author.unwrap_or("ghost"));
    let body = match body.map(str::trim).filter(|b| !b.is_empty()) {
        Some(b) => render_markdown(b),
        None => "<p><em>No description provided.</em></p>".to_string(),
    };
    let _ = write!(
        doc,
        "<section class=\"entry\"><header><strong>{}</strong> commented on {}</header><div class=\"body\">{}</div></section>",
        author,
        fmt_date(at),
        body
    );
}

pub fn build_document(issue: &IssueSummary, comments: &[Comment]) -> String {
    let title = escape_html(&issue.title);
    let mut doc = String::new();
    let _ = write!(
        doc,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{} #{}</title><style>{}</style></head><body>",
        title, issue.number, STYLE
    );
    let _ = write!(
        doc,
        "<h1>{} <span class=\"number\">#{}</span></h1>",
        title, issue.number
    );

    let state = match &issue.closed_at {
        Some(closed) => format!("closed {}", fmt_date(closed)),
        None => "open".to_string(),
    };
    let _ = write!(
        doc,
        "<div class=\"meta\">{}/{} &middot; opened {} &middot; {}</div>",
        escape_html(&issue.owner),
        escape_html(&issue.repo),
        fmt_date(&issue.created_at),
        state
    );
    if !issue.labels.is_empty() {
        doc.push_str("<div class=\"meta\">");
        for label in &issue.labels {
            let _ = write!(doc, "<span class=\"label\">{}</span>", escape_html(label));
        }
        doc.push_str("</div>");
    }

    push_entry(
        &mut doc,
        issue.author.as_deref(),
        &issue.created_at,
        issue.body.as_deref(),
    );
    for c in comments {
        push_entry(&mut doc, c.author.as_deref(), &c.created_at, c.body.as_deref());
    }
    doc.push_str("</body></html>");
    doc
}
