use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("gh-issue-pdf")
        .about("Save GitHub issues as one PDF per issue under ./data/output")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .num_args(1)
                .help("Override RUST_LOG level (e.g., info, debug)"),
        )
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version and exit")
                .action(ArgAction::SetTrue),
        )
}

pub fn init_logging(level: Option<&str>) {
    // Respect explicit level, else default to info, allow env override via RUST_LOG
    if let Some(lvl) = level {
        std::env::set_var("RUST_LOG", lvl);
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_level_and_version() {
        let m = build_cli()
            .try_get_matches_from(["gh-issue-pdf", "--log-level", "debug", "--version"])
            .unwrap();
        assert_eq!(
            m.get_one::<String>("log-level").map(String::as_str),
            Some("debug")
        );
        assert!(m.get_flag("version"));
    }
}
