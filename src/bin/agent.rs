//! `missionminder-agent`: watch the SavedVariables file and log mission
//! status until Ctrl+C.
//!
//! Usage: `missionminder-agent [--config PATH] [SAVED_VARIABLES_DIR]`

use missionminder::{Agent, AgentConfig, LogSink};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    config: Option<PathBuf>,
    saved_variables_dir: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config: None,
        saved_variables_dir: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{arg} requires a path"))?;
                parsed.config = Some(PathBuf::from(path));
            }
            "-h" | "--help" => {
                println!("Usage: missionminder-agent [--config PATH] [SAVED_VARIABLES_DIR]");
                std::process::exit(0);
            }
            other if parsed.saved_variables_dir.is_none() => {
                parsed.saved_variables_dir = Some(PathBuf::from(other));
            }
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("missionminder=info")),
        )
        .init();

    let args = parse_args()?;
    let mut config = match args.config {
        Some(ref path) => AgentConfig::from_file(path)?,
        None => AgentConfig::load_or_default(&AgentConfig::default_config_path())?,
    };
    if let Some(dir) = args.saved_variables_dir {
        config.addon.saved_variables_dir = dir;
    }

    let sink = LogSink::new(
        config.refresh.follower_type(),
        config.refresh.max_next_complete,
    );
    let agent = Agent::start(&config, sink)?;

    let cancel = agent.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel.cancel();
        }
    });

    agent.run_until_cancelled().await?;
    Ok(())
}
