use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 15;
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Runtime configuration for the GitHub client and the render pipeline.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: Option<String>,
    pub api_url: String,
    pub api_version: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub output_dir: PathBuf,
    pub token_file: PathBuf,
    pub concurrency: usize,
    pub per_page: u32,
    pub render_timeout: Option<Duration>,
    pub browser: Option<PathBuf>,
    pub standalone: bool,
    pub no_sandbox: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            api_url: "https://api.github.com".to_string(),
            api_version: "2022-11-28".to_string(),
            user_agent: default_user_agent(),
            timeout_secs: 30,
            output_dir: PathBuf::from("./data/output"),
            token_file: PathBuf::from("./data/token.json"),
            concurrency: DEFAULT_CONCURRENCY,
            per_page: DEFAULT_PER_PAGE,
            render_timeout: None,
            browser: None,
            standalone: false,
            no_sandbox: false,
        }
    }
}

fn default_user_agent() -> String {
    format!("gh-issue-pdf/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

fn env_flag(key: &str) -> bool {
    matches!(env::var(key).as_deref(), Ok("1") | Ok("true"))
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GITHUB_TOKEN (or GH_TOKEN) [optional; falls back to the token store]
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_HTTP_TIMEOUT_SECS (default: 30)
    /// - GITHUB_USER_AGENT (default: gh-issue-pdf/<version>)
    /// - ISSUE_PDF_OUTPUT_DIR (default: ./data/output)
    /// - ISSUE_PDF_TOKEN_FILE (default: ./data/token.json)
    /// - ISSUE_PDF_CONCURRENCY (default: 15, clamped to 1..=64)
    /// - ISSUE_PDF_PER_PAGE (default: 100, clamped to 1..=100)
    /// - ISSUE_PDF_RENDER_TIMEOUT_SECS (default: unset, no timeout)
    /// - ISSUE_PDF_BROWSER (default: first Chrome/Chromium found on PATH)
    /// - ISSUE_PDF_STANDALONE=1 (browser bundled next to the executable)
    /// - ISSUE_PDF_NO_SANDBOX=1 (pass --no-sandbox, e.g. when running as root in a container)
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();
        let token = env::var("GITHUB_TOKEN")
            .or_else(|_| env::var("GH_TOKEN"))
            .ok()
            .filter(|t| !t.trim().is_empty());

        let api_url = env::var("GITHUB_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        let api_version = env::var("GITHUB_API_VERSION").unwrap_or(defaults.api_version);
        let timeout_secs = parse_env::<u64>("GITHUB_HTTP_TIMEOUT_SECS").unwrap_or(30);
        let user_agent = env::var("GITHUB_USER_AGENT").unwrap_or(defaults.user_agent);

        let output_dir = env::var("ISSUE_PDF_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);
        let token_file = env::var("ISSUE_PDF_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.token_file);
        let concurrency = parse_env::<usize>("ISSUE_PDF_CONCURRENCY")
            .unwrap_or(DEFAULT_CONCURRENCY)
            .clamp(1, 64);
        let per_page = parse_env::<u32>("ISSUE_PDF_PER_PAGE")
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, 100);
        let render_timeout = parse_env::<u64>("ISSUE_PDF_RENDER_TIMEOUT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs);
        let browser = env::var("ISSUE_PDF_BROWSER").ok().map(PathBuf::from);
        let standalone = env_flag("ISSUE_PDF_STANDALONE");
        let no_sandbox = env_flag("ISSUE_PDF_NO_SANDBOX");

        if api_url.is_empty() {
            return Err("GITHUB_API_URL must not be empty".to_string());
        }

        Ok(Self {
            token,
            api_url,
            api_version,
            user_agent,
            timeout_secs,
            output_dir,
            token_file,
            concurrency,
            per_page,
            render_timeout,
            browser,
            standalone,
            no_sandbox,
        })
    }
}
