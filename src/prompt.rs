//! Interactive collection of a [`FetchConfig`].
//!
//! The validators are plain functions so they can be tested without a terminal.

use crate::config::Config;
use crate::token::TokenStore;
use crate::types::{AccountType, FetchConfig, RepoSelection};
use anyhow::Context;
use chrono::Datelike;
use dialoguer::{Input, Password, Select};
use log::{info, warn};

const TOKEN_PREFIXES: &[&str] = &["ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_"];
const FIRST_GITHUB_YEAR: i32 = 2008;

pub fn validate_token(token: &str) -> Result<(), String> {
    let token = token.trim();
    if token.is_empty() {
        return Err("Token must not be empty".into());
    }
    if token.chars().any(char::is_whitespace) {
        return Err("Token must not contain whitespace".into());
    }
    let prefixed = TOKEN_PREFIXES.iter().any(|p| token.starts_with(p));
    let classic = token.len() == 40 && token.chars().all(|c| c.is_ascii_hexdigit());
    if prefixed || classic {
        Ok(())
    } else {
        Err("That does not look like a GitHub token (expected ghp_…, github_pat_… or a 40-char hex token)".into())
    }
}

/// Account and repository names: non-empty, `[A-Za-z0-9._-]`.
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name must not be empty".into());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(format!("'{}' contains characters GitHub does not allow", name));
    }
    Ok(())
}

/// Splits a comma-separated repository list, dropping blanks.
pub fn parse_repo_list(raw: &str) -> Result<Vec<String>, String> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err("Enter at least one repository name".into());
    }
    for name in &names {
        validate_name(name)?;
    }
    Ok(names)
}

/// Empty input means "no year filter".
pub fn parse_year(raw: &str, current_year: i32) -> Result<Option<i32>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let year: i32 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a year", raw))?;
    if !(FIRST_GITHUB_YEAR..=current_year).contains(&year) {
        return Err(format!(
            "Year must be between {} and {}",
            FIRST_GITHUB_YEAR, current_year
        ));
    }
    Ok(Some(year))
}

/// Token from the environment, else the token store, else a prompt whose
/// answer is written back to the store.
pub fn resolve_token(cfg: &Config, store: &TokenStore) -> anyhow::Result<String> {
    if let Some(token) = &cfg.token {
        return Ok(token.clone());
    }
    match store.load() {
        Ok(Some(token)) => return Ok(token),
        Ok(None) => {}
        Err(e) => warn!("Ignoring stored token: {}", e),
    }
    let token = loop {
        let entered = Password::new()
            .with_prompt("GitHub personal access token")
            .interact()
            .context("reading token")?;
        match validate_token(&entered) {
            Ok(()) => break entered.trim().to_string(),
            Err(msg) => eprintln!("{}", msg),
        }
    };
    store.save(&token)?;
    info!("Token saved to {}", store.path().display());
    Ok(token)
}

fn prompt_name(prompt: &str) -> anyhow::Result<String> {
    let name: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| validate_name(input))
        .interact_text()?;
    Ok(name.trim().to_string())
}

pub fn collect(cfg: &Config, store: &TokenStore) -> anyhow::Result<FetchConfig> {
    let token = resolve_token(cfg, store)?;

    let account_type = match Select::new()
        .with_prompt("Is this an organization or a user account?")
        .items(&["Organization", "User"])
        .default(0)
        .interact()?
    {
        0 => AccountType::Organization,
        _ => AccountType::User,
    };
    let account = prompt_name(&format!("{} name", account_type))?;

    let selection = match Select::new()
        .with_prompt("Which repositories?")
        .items(&["One repository", "Several repositories", "All repositories"])
        .default(0)
        .interact()?
    {
        0 => RepoSelection::One(prompt_name("Repository name")?),
        1 => {
            let raw: String = Input::new()
                .with_prompt("Repository names (comma separated)")
                .validate_with(|input: &String| parse_repo_list(input).map(|_| ()))
                .interact_text()?;
            RepoSelection::Multiple(parse_repo_list(&raw).map_err(anyhow::Error::msg)?)
        }
        _ => RepoSelection::All,
    };

    let current_year = chrono::Utc::now().year();
    let raw_year: String = Input::new()
        .with_prompt("Only issues open during year (leave empty for all)")
        .allow_empty(true)
        .validate_with(move |input: &String| parse_year(input, current_year).map(|_| ()))
        .interact_text()?;
    let year = parse_year(&raw_year, current_year).map_err(anyhow::Error::msg)?;

    Ok(FetchConfig {
        account,
        account_type,
        selection,
        year,
        token,
    })
}
