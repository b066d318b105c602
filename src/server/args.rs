use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use super::{ServeOptions, ServerConfig};
use crate::executor::Overflow;
use crate::tree;
use crate::utils;

/// Environment variable consulted when `--port` is not given.
const PORT_ENV: &str = "GARTER_PORT";

/// Arguments of the (usually hidden) `server` subcommand.
///
/// Embed as a subcommand variant of any clap CLI and call [`ServeArgs::run`]
/// with the root `clap::Command`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on (falls back to GARTER_PORT, then 8000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 900)]
    pub timeout: u64,

    /// Maximum concurrently running commands (0 = unbounded)
    #[arg(long, default_value_t = 32)]
    pub max_concurrent: usize,

    /// Answer 503 instead of queueing when all command slots are busy
    #[arg(long)]
    pub reject_when_busy: bool,

    /// Override the description shown in /swagger
    #[arg(long)]
    pub description: Option<String>,

    /// Override the version shown in /swagger
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl ServeArgs {
    pub fn options(&self) -> ServeOptions {
        let port = resolve_port(self.port, std::env::var(PORT_ENV).ok().as_deref());
        ServeOptions {
            bind: self.bind.clone(),
            port,
            timeout: Duration::from_secs(self.timeout),
            max_concurrent: self.max_concurrent,
            overflow: if self.reject_when_busy {
                Overflow::Reject
            } else {
                Overflow::Queue
            },
        }
    }

    pub fn config(&self, root: &clap::Command) -> Result<ServerConfig> {
        let mut config = ServerConfig::from_command(root)?;
        if let Some(description) = &self.description {
            config = config.with_description(description.clone());
        }
        if self.api_version.is_some() {
            config = config.with_version(self.api_version.clone());
        }
        Ok(config)
    }

    /// Snapshot `root`, then host it until Ctrl-C.
    pub fn run(self, root: clap::Command) -> Result<()> {
        utils::init_logging(utils::derive_level(self.verbose, self.quiet));

        let config = self.config(&root)?;
        let options = self.options();
        let tree = tree::build(&root);

        let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
        rt.block_on(super::serve(tree, config, options))
    }
}

/// `--port`, else a parseable `GARTER_PORT`, else the default.
fn resolve_port(flag: Option<u16>, env: Option<&str>) -> u16 {
    flag.or_else(|| env.and_then(|p| p.trim().parse().ok()))
        .unwrap_or(ServeOptions::default().port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn flags_translate_to_options() {
        let h = Harness::parse_from([
            "server",
            "--port",
            "9100",
            "--timeout",
            "5",
            "--max-concurrent",
            "2",
            "--reject-when-busy",
        ]);
        let opts = h.serve.options();
        assert_eq!(opts.port, 9100);
        assert_eq!(opts.timeout, Duration::from_secs(5));
        assert_eq!(opts.max_concurrent, 2);
        assert_eq!(opts.overflow, Overflow::Reject);
    }

    #[test]
    fn overrides_replace_cli_metadata() {
        let h = Harness::parse_from([
            "server",
            "--description",
            "HTTP bridge",
            "--api-version",
            "3.0.0",
        ]);
        let root = clap::Command::new("example").about("ignored").version("1.2.3");
        let cfg = h.serve.config(&root).unwrap();
        assert_eq!(cfg.description(), "HTTP bridge");
        assert_eq!(cfg.version(), "3.0.0");
    }

    #[test]
    fn port_falls_back_to_env_then_default() {
        assert_eq!(resolve_port(None, Some("9200")), 9200);
        assert_eq!(resolve_port(None, Some(" 9201\n")), 9201);
        assert_eq!(resolve_port(None, Some("not-a-port")), 8000);
        assert_eq!(resolve_port(None, None), 8000);
    }

    #[test]
    fn port_flag_wins_over_env() {
        let h = Harness::parse_from(["server", "--port", "9100"]);
        assert_eq!(resolve_port(h.serve.port, Some("9200")), 9100);
    }
}
