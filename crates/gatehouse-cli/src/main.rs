//! Operator CLI for Gatehouse
//!
//! Prints the composed permission tree of the event platform and evaluates
//! single field accesses against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gatehouse_authorization::ShieldConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod commands;

use commands::{check, tree};

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(about = "Gatehouse - role-gated GraphQL field permissions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Shield config file path
    #[arg(short, long, global = true, default_value = "gatehouse.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the composed permission tree
    Tree(tree::TreeArgs),

    /// Evaluate one field access
    Check(check::CheckArgs),
}

fn load_config(path: &Path) -> Result<ShieldConfig> {
    let mut config = ShieldConfig::load_from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    config.merge_with_env().context("applying GATEHOUSE_* overrides")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Tree(args) => {
            tree::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            let config = load_config(&cli.config)?;
            Ok(check::run(&args, config).await?.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "gatehouse",
            "--verbose",
            "check",
            "--field",
            "Mutation.createEvent",
            "--caller",
            "u1",
            "--args",
            r#"{"event":{"private":true}}"#,
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("gatehouse.toml"));
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.field, "Mutation.createEvent");
                assert_eq!(args.caller.as_deref(), Some("u1"));
            }
            Commands::Tree(_) => panic!("parsed as tree"),
        }
    }

    #[test]
    fn test_parse_tree_role() {
        let cli = Cli::try_parse_from(["gatehouse", "tree", "--role", "premium"]).unwrap();
        match cli.command {
            Commands::Tree(args) => assert_eq!(args.role, Some(gatehouse_events::Role::Premium)),
            Commands::Check(_) => panic!("parsed as check"),
        }
    }

    #[test]
    fn test_missing_config_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("gatehouse.toml")).unwrap();
        assert_eq!(config.fallback_error, ShieldConfig::default().fallback_error);
    }
}
