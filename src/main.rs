use std::io;
use std::path::Path;

use anyhow::Context;
use artifacter_client::{session, Client, ServiceConfig};
use clap::{ArgAction, Parser};
use log::LevelFilter;

/// Render an Artifacter card for one of a player's characters
#[derive(Parser, Debug)]
#[command(name = "artifacter", version, about)]
struct Cli {
    /// Base URL of the Artifacter HTTP API
    #[arg(long, env = "ARTIFACTER_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Override the User-Agent sent to the API
    #[arg(long)]
    user_agent: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = ServiceConfig {
        api_url: cli.api_url,
        ..Default::default()
    };
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }

    let client = Client::new(config)
        .await
        .context("failed to start the generation service")?;

    let stdin = io::stdin();
    session::run(
        &client,
        stdin.lock(),
        io::stdout(),
        Path::new(session::OUTPUT_PATH),
    )
    .await
    .context("card generation failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["artifacter"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.user_agent.is_none());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "artifacter",
            "--api-url",
            "http://api.example:8080",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://api.example:8080");
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_api_url_from_env() {
        std::env::set_var("ARTIFACTER_API_URL", "http://from-env:3000");
        let from_env = Cli::try_parse_from(["artifacter"]).unwrap();
        let flag_wins =
            Cli::try_parse_from(["artifacter", "--api-url", "http://from-flag:3000"]).unwrap();
        std::env::remove_var("ARTIFACTER_API_URL");

        assert_eq!(from_env.api_url, "http://from-env:3000");
        assert_eq!(flag_wins.api_url, "http://from-flag:3000");
    }

    #[test]
    fn test_cli_has_no_generation_overrides() {
        assert!(Cli::try_parse_from(["artifacter", "--lang", "en"]).is_err());
        assert!(Cli::try_parse_from(["artifacter", "--output", "x.png"]).is_err());
    }
}
