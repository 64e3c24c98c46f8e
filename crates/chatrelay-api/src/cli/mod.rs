//! CLI command definitions for the `chatrelay` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod check_config;
pub mod log;
pub mod probe;

use clap::{Parser, Subcommand};

/// Relay LINE conversations to an OpenAI-compatible chat model.
#[derive(Parser)]
#[command(name = "chatrelay", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the LINE webhook server.
    Serve {
        /// Port to listen on (defaults to `[server].port`).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to `[server].host`).
        #[arg(long)]
        host: Option<String>,

        /// Export spans to OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Send test conversations to the inference backend.
    Probe {
        /// Messages to send, one request each. Runs the built-in scenarios
        /// when omitted.
        messages: Vec<String>,
    },

    /// Load config and prompts and print a summary.
    CheckConfig,

    /// List recent exchanges from the audit log.
    Log {
        /// Only show exchanges for this user id.
        #[arg(long)]
        user: Option<String>,

        /// Maximum number of records.
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_log_with_global_json() {
        let cli = Cli::try_parse_from(["chatrelay", "log", "--user", "U1", "-l", "5", "--json"])
            .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Log { user, limit } => {
                assert_eq!(user.as_deref(), Some("U1"));
                assert_eq!(limit, 5);
            }
            _ => panic!("expected log command"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["chatrelay", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, host, otel } => {
                assert!(port.is_none());
                assert!(host.is_none());
                assert!(!otel);
            }
            _ => panic!("expected serve command"),
        }
    }
}
