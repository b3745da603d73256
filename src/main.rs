use gh_issue_pdf::config::Config;
use gh_issue_pdf::dispatch::Dispatcher;
use gh_issue_pdf::token::TokenStore;
use gh_issue_pdf::{cli, prompt};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::build_cli();
    let matches = cmd.get_matches();
    let log_level = matches.get_one::<String>("log-level").cloned();
    let version_flag = matches.get_flag("version");

    cli::init_logging(log_level.as_deref());

    if version_flag {
        println!("gh-issue-pdf {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cfg = Arc::new(Config::from_env().map_err(anyhow::Error::msg)?);
    if cfg.standalone {
        debug!("standalone startup: browser is resolved next to the executable");
    }
    let store = TokenStore::new(cfg.token_file.clone());
    let fetch = prompt::collect(&cfg, &store)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; waiting for in-flight renders to stop");
            on_signal.cancel();
        }
    });

    // Failures past this point are reported, not turned into an exit code.
    let dispatcher = match Dispatcher::from_config(cfg, &fetch, cancel) {
        Ok(d) => d,
        Err(e) => {
            error!("{}", e);
            return Ok(());
        }
    };
    match dispatcher.dispatch(&fetch).await {
        Ok(summary) => info!(
            "Rendered {} PDF(s); {} render failure(s); {} repository fetch failure(s)",
            summary.rendered(),
            summary.render_failures(),
            summary.fetch_failures()
        ),
        Err(e) => error!("{}", e),
    }
    Ok(())
}
