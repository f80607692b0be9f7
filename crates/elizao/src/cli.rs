//! Command-line interface definition using clap.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Elizao - autonomous business task orchestration
#[derive(Parser, Debug)]
#[command(name = "elizao")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "ELIZAO_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduling loop until interrupted
    Run {
        /// Seconds between cycles (default: ELIZAO_CYCLE_INTERVAL_SECS or 300)
        #[arg(short, long)]
        interval: Option<u64>,

        /// JSON file holding an array of tasks to enqueue before starting.
        /// Timestamps may be RFC 3339 or offset-less ISO 8601 (local time).
        #[arg(short, long)]
        tasks: Option<PathBuf>,
    },

    /// Execute a single task immediately and print the outcome
    Exec {
        /// Task type used for routing (e.g. business_analysis)
        #[arg(short = 't', long = "type")]
        task_type: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Task payload as a JSON object
        #[arg(short, long)]
        payload: Option<String>,

        /// Priority hint
        #[arg(long, default_value_t = 0)]
        priority: i32,
    },

    /// Show which agent a task type routes to
    Route {
        /// Task type to route
        #[arg(required = true)]
        task_type: String,
    },

    /// Manage lead records
    Lead {
        #[command(subcommand)]
        action: LeadCommands,
    },

    /// List registered agents with their state and metrics
    Agents,

    /// Verify the model backend is reachable
    Check,

    /// Print storage paths
    Paths,
}

#[derive(Subcommand, Debug)]
pub enum LeadCommands {
    /// Append a new lead record
    Add {
        /// Chat the lead came from; also the key for status updates
        #[arg(long)]
        chat_title: String,

        /// Contact name
        #[arg(long)]
        contact: String,

        #[arg(long, default_value = "")]
        company: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        /// Where the lead came from
        #[arg(long, default_value = "")]
        source: String,

        #[arg(long, default_value = "")]
        notes: String,

        /// Pipeline status
        #[arg(long, default_value = "New")]
        status: String,

        /// Next follow-up date (YYYY-MM-DD)
        #[arg(long)]
        next_follow_up: Option<NaiveDate>,
    },
}

impl Cli {
    /// Returns the state directory, falling back to the configured default.
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .as_ref()
            .map(|p| elizao_core::expand_path(&p.to_string_lossy()))
            .unwrap_or_else(elizao_core::state_dir)
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_from_verbosity() {
        let cli = Cli::parse_from(["elizao", "paths"]);
        assert_eq!(cli.log_level(), tracing::Level::WARN);

        let cli = Cli::parse_from(["elizao", "-vv", "paths"]);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);

        let cli = Cli::parse_from(["elizao", "-vvvv", "paths"]);
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_state_dir_flag() {
        let cli = Cli::parse_from(["elizao", "--state-dir", "/tmp/elizao-state", "agents"]);
        assert_eq!(cli.state_dir(), PathBuf::from("/tmp/elizao-state"));
    }

    #[test]
    fn test_parse_exec() {
        let cli = Cli::parse_from([
            "elizao",
            "exec",
            "--type",
            "business_analysis",
            "--payload",
            r#"{"messages":[]}"#,
            "--priority",
            "2",
        ]);
        match cli.command {
            Commands::Exec {
                task_type,
                description,
                payload,
                priority,
            } => {
                assert_eq!(task_type, "business_analysis");
                assert_eq!(description, "");
                assert_eq!(payload.as_deref(), Some(r#"{"messages":[]}"#));
                assert_eq!(priority, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_lead_add() {
        let cli = Cli::parse_from([
            "elizao",
            "lead",
            "add",
            "--chat-title",
            "Acme group",
            "--contact",
            "Jane",
            "--next-follow-up",
            "2026-03-01",
        ]);
        match cli.command {
            Commands::Lead {
                action:
                    LeadCommands::Add {
                        chat_title,
                        status,
                        next_follow_up,
                        ..
                    },
            } => {
                assert_eq!(chat_title, "Acme group");
                assert_eq!(status, "New");
                assert_eq!(next_follow_up, NaiveDate::from_ymd_opt(2026, 3, 1));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_follow_up_date_rejected() {
        let result = Cli::try_parse_from([
            "elizao",
            "lead",
            "add",
            "--chat-title",
            "Acme",
            "--contact",
            "Jane",
            "--next-follow-up",
            "tomorrow",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_route_requires_type() {
        assert!(Cli::try_parse_from(["elizao", "route"]).is_err());
    }
}
