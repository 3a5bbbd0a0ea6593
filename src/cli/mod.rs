//! CLI module for fitcoach
//!
//! Command-line interface for the fitcoach binary: `serve` runs the proxy
//! server, every other subcommand drives one of the page controllers against
//! the backend using the stored session token.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod output;

use crate::types::PlanType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// fitcoach - AI gym coach client
///
/// Chat with the coach, keep workout and diet plans, maintain a fitness
/// profile and track progress from the terminal, or run the proxy server.
#[derive(Parser, Debug)]
#[command(
    name = "fitcoach",
    version,
    about = "fitcoach - AI gym coach client and proxy",
    long_about = "Terminal client for the AI gym coach backend.\n\n\
                  Run without arguments to start the proxy server, or use a subcommand\n\
                  to work with chat, plans, profile and progress directly.",
    after_help = "EXAMPLES:\n    \
                  fitcoach login alice            # Sign in and store the token\n    \
                  fitcoach chat send \"Leg day?\"   # Ask the coach\n    \
                  fitcoach plans create workout   # Quick-create a workout plan\n    \
                  fitcoach progress trends weight --days 30\n    \
                  fitcoach serve --config my.toml # Start the proxy server"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "fitcoach.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the proxy server
    Serve,

    /// Sign in and store the access token
    Login {
        /// Account username
        username: String,

        /// Account password (prompted when omitted)
        #[arg(long, env = "FITCOACH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create a new account
    Register {
        username: String,
        email: String,

        /// At least 8 characters (prompted when omitted)
        #[arg(long, env = "FITCOACH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored access token
    Logout,

    /// Talk to the coach
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Manage workout and diet plans
    #[command(subcommand)]
    Plans(PlanCommands),

    /// Show or edit the fitness profile
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Track progress entries, trends and analysis
    #[command(subcommand)]
    Progress(ProgressCommands),

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// Chat subcommands
#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// Show the conversation
    History,

    /// Send a message and print the coach's reply
    Send {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Save a coach message as a workout or diet plan
    SavePlan {
        /// Message id as shown by `chat history`
        message_id: String,

        /// workout or diet
        plan_type: PlanType,
    },
}

/// Plan subcommands
#[derive(Subcommand, Debug)]
pub enum PlanCommands {
    /// List plans
    List {
        /// all, workout or diet
        #[arg(short, long, default_value = "all")]
        tab: String,
    },

    /// Show one plan
    Show { id: i64 },

    /// Create a plan
    ///
    /// Without --title a dated template plan is created. With --title the
    /// plan is composed from --exercise or --meal items.
    Create {
        /// workout, diet or meditation
        plan_type: PlanType,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        /// Exercise as `name[;sets[;reps[;notes]]]`
        #[arg(long = "exercise")]
        exercises: Vec<String>,

        /// Meal as `name[;calories[;ingredients[;notes]]]`
        #[arg(long = "meal")]
        meals: Vec<String>,
    },

    /// Edit a plan's title, content or type
    Edit {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        /// New content, or `@path` to read it from a file
        #[arg(long)]
        content: Option<String>,

        #[arg(long = "type")]
        plan_type: Option<PlanType>,
    },

    /// Delete a plan
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Ask the coach to analyze a plan
    Analyze { id: i64 },
}

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show the fitness profile
    Show,

    /// Update profile fields
    Set {
        /// `field=value` pairs, an empty value clears the field
        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,
    },
}

/// Progress subcommands
#[derive(Subcommand, Debug)]
pub enum ProgressCommands {
    /// List entries
    List {
        /// Only entries from the last N days
        #[arg(long)]
        days: Option<u32>,
    },

    /// Show one entry
    Show { id: i64 },

    /// Record a new entry
    Add {
        /// `field=value` pairs, e.g. weight=80.5 measurement.waist=82
        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,
    },

    /// Change an existing entry
    Edit {
        id: i64,

        #[arg(required = true, num_args = 1..)]
        fields: Vec<String>,
    },

    /// Delete an entry
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show how one metric changed over time
    Trends {
        #[arg(default_value = "weight")]
        metric: String,

        /// 30, 90, 180 or 365
        #[arg(long, default_value_t = crate::client::DEFAULT_TREND_DAYS)]
        days: u32,
    },

    /// Show the coach's progress analysis
    Analysis {
        #[arg(long, default_value_t = crate::client::DEFAULT_ANALYSIS_DAYS)]
        days: u32,
    },

    /// Generate a plan adapted to recent progress
    AdaptivePlan {
        /// workout, diet or meditation
        plan_type: PlanType,

        /// Plan to adapt
        #[arg(long)]
        original_plan_id: Option<i64>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
