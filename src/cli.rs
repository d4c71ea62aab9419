use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "wheelhouse", version, about = "Inspect and maintain the wheelhouse catalog")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to `config.toml` in the
    /// platform config directory, if present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List wheels of latest versions that still need inspecting.
    Queue {
        /// Skip wheels larger than this many bytes. Overrides the configured limit.
        #[arg(long, value_name = "BYTES")]
        max_size: Option<u64>,
    },
    /// Delete versions superseded by a newer one, keeping inspected history.
    Purge,
    /// Show the sync cursor along with project and orphan counts.
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_queue_args() {
        let cli = Cli::try_parse_from(["wheelhouse", "queue", "--max-size", "1024", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Queue { max_size: Some(1024) }));
    }
}
