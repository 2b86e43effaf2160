//! Command-line argument parsing.
//!
//! Flags given here override the `QA_COPILOT_*` environment variables, which
//! override the built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::ClientConfig;
use crate::error::CopilotResult;
use crate::models::JobStatus;

#[derive(Debug, Parser)]
#[command(
    name = "qa-copilot",
    version,
    about = "Command-line client for the SAP QA Copilot backend"
)]
pub struct Cli {
    /// Backend base URL (overrides QA_COPILOT_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// REST request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Abort a chat stream after this many seconds without data
    #[arg(long, global = true, value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Preferences file (overrides QA_COPILOT_PREFS)
    #[arg(long, global = true, value_name = "PATH")]
    pub preferences: Option<PathBuf>,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment-derived config with these flags applied on top.
    pub fn client_config(&self) -> CopilotResult<ClientConfig> {
        let mut config = ClientConfig::from_env()?;
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.base_url {
            *config = config.clone().with_base_url(url.trim());
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.idle_timeout {
            config.stream_idle_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(path) = &self.preferences {
            config.preferences_path = Some(path.clone());
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check backend health
    Health,
    /// Send a chat message
    Chat(ChatArgs),
    /// Manage saved conversations
    #[command(subcommand)]
    Conversations(ConversationsCommand),
    /// Manage workspaces and their files
    #[command(subcommand)]
    Workspaces(WorkspacesCommand),
    /// Inspect and control test jobs
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Manage recurring test schedules
    #[command(subcommand)]
    Schedules(SchedulesCommand),
    /// List and download reports
    #[command(subcommand)]
    Reports(ReportsCommand),
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// The message to send
    pub message: String,

    /// Continue this conversation
    #[arg(long, value_name = "ID")]
    pub conversation: Option<String>,

    /// Continue the conversation of the previous chat
    #[arg(long = "continue", conflicts_with = "conversation")]
    pub resume: bool,

    /// Scope the turn to a workspace (repeatable; default: saved selection)
    #[arg(long = "workspace", value_name = "ID")]
    pub workspaces: Vec<String>,

    /// Wait for the complete answer instead of streaming
    #[arg(long)]
    pub no_stream: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConversationsCommand {
    List,
    Show { id: String },
    Rename { id: String, title: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum WorkspacesCommand {
    List,
    Show {
        id: String,
    },
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Print one workspace file
    ReadFile {
        id: String,
        path: String,
    },
    /// Upload a local file (or --content) to a workspace path
    WriteFile {
        id: String,
        path: String,
        #[arg(long, value_name = "LOCAL_PATH", conflicts_with = "content")]
        from: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Set the workspaces used by `chat` when none are given
    Select {
        ids: Vec<String>,
        /// Flip each id instead of replacing the selection
        #[arg(long)]
        toggle: bool,
    },
    /// Show the saved selection, dropping ids the backend no longer has
    Selected,
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    List {
        #[arg(long)]
        status: Option<JobStatus>,
        #[arg(long)]
        limit: Option<u32>,
    },
    Show {
        id: String,
    },
    Cancel {
        id: String,
    },
    /// Follow one job, or all active jobs, until nothing is running
    Watch {
        id: Option<String>,
        /// Poll interval in seconds (default: QA_COPILOT_POLL_SECS or 5)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct ScheduleFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Cron expression, e.g. "0 2 * * *"
    #[arg(long, value_name = "EXPR")]
    pub cron: Option<String>,
    #[arg(long = "workspace", value_name = "ID")]
    pub workspaces: Vec<String>,
    #[arg(long = "test", value_name = "ID")]
    pub tests: Vec<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Create or leave the schedule disabled
    #[arg(long)]
    pub disabled: bool,
}

#[derive(Debug, Subcommand)]
pub enum SchedulesCommand {
    List,
    Show {
        id: String,
    },
    Create(ScheduleFields),
    /// Change the given fields, keeping the rest
    Update {
        id: String,
        #[command(flatten)]
        fields: ScheduleFields,
    },
    Delete {
        id: String,
    },
    Toggle {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    List,
    Fetch {
        id: String,
        /// Write the HTML here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}
