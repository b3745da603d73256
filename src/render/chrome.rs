use crate::config::Config;
use crate::error::RenderError;
use async_trait::async_trait;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

const BROWSER_CANDIDATES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// What the browser should load before printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintSource {
    Url(String),
    Html(String),
}

#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn print(
        &self,
        source: &PrintSource,
        out: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), RenderError>;
}

/// Prints pages with a headless Chrome/Chromium process, one process per page.
#[derive(Debug, Clone)]
pub struct ChromeEngine {
    executable: PathBuf,
    timeout: Option<Duration>,
    sandbox: bool,
}

impl ChromeEngine {
    pub fn new(executable: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            executable,
            timeout,
            sandbox: true,
        }
    }

    /// Runs the browser with `--no-sandbox`.
    pub fn without_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Resolve the browser executable for this run.
    ///
    /// Standalone builds ship the browser in a `chrome/` directory beside the
    /// binary; otherwise `ISSUE_PDF_BROWSER` wins, then the first candidate on `PATH`.
    pub fn locate(cfg: &Config) -> Result<Self, RenderError> {
        let executable = if cfg.standalone {
            bundled_browser()?
        } else if let Some(explicit) = &cfg.browser {
            explicit.clone()
        } else {
            BROWSER_CANDIDATES
                .iter()
                .find_map(|name| which::which(name).ok())
                .ok_or_else(|| {
                    RenderError::BrowserNotFound(format!(
                        "none of {} on PATH; set ISSUE_PDF_BROWSER",
                        BROWSER_CANDIDATES.join(", ")
                    ))
                })?
        };
        let engine = Self::new(executable, cfg.render_timeout);
        Ok(if cfg.no_sandbox {
            engine.without_sandbox()
        } else {
            engine
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn command(&self, url: &str, out: &Path) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg("--headless").arg("--disable-gpu");
        if !self.sandbox {
            cmd.arg("--no-sandbox");
        }
        cmd.arg("--hide-scrollbars")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", out.display()))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, url: &str, out: &Path) -> Result<(), RenderError> {
        debug!("printing {} -> {}", url, out.display());
        let child = self.command(url, out).spawn().map_err(|e| RenderError::Io {
            path: self.executable.clone(),
            source: e,
        })?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RenderError::Io {
                path: self.executable.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(RenderError::Browser {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn bundled_browser() -> Result<PathBuf, RenderError> {
    let exe =
        std::env::current_exe().map_err(|e| RenderError::BrowserNotFound(e.to_string()))?;
    let dir = exe.parent().ok_or_else(|| {
        RenderError::BrowserNotFound("executable has no parent directory".into())
    })?;
    let name = if cfg!(windows) { "chrome.exe" } else { "chrome" };
    let path = dir.join("chrome").join(name);
    if !path.exists() {
        return Err(RenderError::BrowserNotFound(format!(
            "bundled browser missing at {}",
            path.display()
        )));
    }
    Ok(path)
}

fn write_temp_html(html: &str) -> Result<tempfile::NamedTempFile, RenderError> {
    let io_err = |source| RenderError::Io {
        path: std::env::temp_dir(),
        source,
    };
    let mut file = tempfile::Builder::new()
        .prefix("issue-")
        .suffix(".html")
        .tempfile()
        .map_err(io_err)?;
    file.write_all(html.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(file)
}

#[async_trait]
impl PdfEngine for ChromeEngine {
    async fn print(
        &self,
        source: &PrintSource,
        out: &Path,
        cancel: &CancellationToken,
    ) -> Result<(), RenderError> {
        // The temp file must outlive the browser process.
        let (url, _page) = match source {
            PrintSource::Url(url) => (url.clone(), None),
            PrintSource::Html(html) => {
                let file = write_temp_html(html)?;
                let url = url::Url::from_file_path(file.path())
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| format!("file://{}", file.path().display()));
                (url, Some(file))
            }
        };

        let job = async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, self.run(&url, out)).await {
                    Ok(res) => res,
                    Err(_) => Err(RenderError::Timeout(limit)),
                },
                None => self.run(&url, out).await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RenderError::Cancelled),
            res = job => res,
        }
    }
}
