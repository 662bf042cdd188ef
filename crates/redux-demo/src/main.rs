use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use redux_store::ListenerErrorPolicy;
use redux_store_config::DemoConfig;
use std::path::PathBuf;

mod counter;
mod logger;
mod replay;
mod slices;

#[derive(Parser)]
#[command(name = "redux-demo", version, about = "Walk through the redux-store crate")]
struct Cli {
    /// Config file to use instead of .redux-demo.toml lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the listener failure policy from the config
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Counter store with increment/decrement and a printing subscriber
    Counter,
    /// Counter and auth slices combined into one store
    Slices,
    /// Dispatch a JSON array of actions against the slices store
    Replay {
        /// Path to the action script
        script: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    LogAndContinue,
    Collect,
}

impl From<PolicyArg> for ListenerErrorPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::LogAndContinue => ListenerErrorPolicy::LogAndContinue,
            PolicyArg::Collect => ListenerErrorPolicy::Collect,
        }
    }
}

fn load_config(cli: &Cli) -> Result<DemoConfig> {
    let mut config = match &cli.config {
        Some(path) => DemoConfig::load_from_path(path)?,
        None => DemoConfig::load(),
    };
    if let Some(policy) = cli.policy {
        config.listener_error_policy = policy.into();
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(log_file) = logger::init(&config)? {
        log::info!("Logging to {}", log_file.display());
    }
    log::debug!("Using config {:?}", config);

    match &cli.command {
        Command::Counter => counter::run(&config),
        Command::Slices => slices::run(&config),
        Command::Replay { script } => replay::run(&config, script),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_policy_override() {
        let cli = Cli::try_parse_from(["redux-demo", "--policy", "collect", "counter"]).unwrap();
        assert!(matches!(cli.command, Command::Counter));

        let config = load_config(&cli).unwrap();
        assert_eq!(config.listener_error_policy, ListenerErrorPolicy::Collect);
    }

    #[test]
    fn test_cli_parses_replay_script() {
        let cli = Cli::try_parse_from(["redux-demo", "replay", "actions.json"]).unwrap();
        match cli.command {
            Command::Replay { script } => assert_eq!(script, PathBuf::from("actions.json")),
            _ => panic!("expected replay command"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["redux-demo"]).is_err());
    }
}
