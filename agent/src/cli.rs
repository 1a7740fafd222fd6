// agent/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Broker-connected module-dispatch agent.
///
/// Connects to a central broker (via whatever `Connector` is wired in),
/// loads the modules found under `--modules-dir`, and serves action
/// requests until killed. The transport itself, daemonization, and
/// installation layout are deliberately left to the deployment environment.
#[derive(Parser, Debug)]
#[command(name = "node-agent")]
#[command(version)]
#[command(about = "Broker-connected module-dispatch agent", long_about = None)]
pub struct Cli {
    /// Optional YAML configuration file. Missing fields fall back to
    /// defaults; a missing file falls back to an all-default configuration.
    #[arg(long, env = "NODE_AGENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Overrides `modules_dir` from the config file.
    #[arg(long, env = "NODE_AGENT_MODULES_DIR")]
    pub modules_dir: Option<PathBuf>,

    /// Overrides `results_dir` from the config file.
    #[arg(long, env = "NODE_AGENT_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_no_arguments() {
        let args = Cli::parse_from(["node-agent"]);
        assert!(args.config.is_none());
        assert!(args.modules_dir.is_none());
    }

    #[test]
    fn parses_modules_dir_override() {
        let args = Cli::parse_from(["node-agent", "--modules-dir", "/srv/modules"]);
        assert_eq!(args.modules_dir, Some(PathBuf::from("/srv/modules")));
    }
}
