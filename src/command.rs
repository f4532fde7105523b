use clap::{Args, Parser, Subcommand};
use thiserror::Error;

mod run;

pub use run::run;


pub const DEFAULT_SERVER: &str = "http://localhost:8080";


#[derive(Debug, Parser)]
#[command(name = "jobman", version, about = "Create, search, run and delete remote tasks")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}


#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve an in-memory tasks backend
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// List every task
    List(Remote),
    /// List tasks whose name matches
    Find {
        name: String,
        #[command(flatten)]
        remote: Remote,
    },
    /// Create a task from flags or a YAML file
    Create(Create),
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        remote: Remote,
    },
    /// Run a task's command on the backend and show its output
    Run {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        #[command(flatten)]
        remote: Remote,
    },
    /// Show the output of a task's last execution
    Output {
        id: String,
        #[command(flatten)]
        remote: Remote,
    },
    /// Interactive task shell
    Shell(Remote),
}


#[derive(Debug, Args)]
pub struct Remote {
    /// Base URL of the tasks backend
    #[arg(long, env = "JOBMAN_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,
}


#[derive(Debug, Args)]
pub struct Create {
    #[arg(long, conflicts_with = "file")]
    pub name: Option<String>,
    #[arg(long, conflicts_with = "file")]
    pub owner: Option<String>,
    #[arg(long, conflicts_with = "file")]
    pub command: Option<String>,
    /// YAML file with `name`, `owner` and `command`
    #[arg(short, long)]
    pub file: Option<String>,
    #[command(flatten)]
    pub remote: Remote,
}


#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("{0}")]
    Failed(String),
}
