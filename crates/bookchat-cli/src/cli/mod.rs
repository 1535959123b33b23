//! CLI command definitions for the `bchat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod auth;
pub mod chat;
pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with the book recommendation service.
#[derive(Parser)]
#[command(name = "bchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors and replies.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Recommendation endpoint, overriding config.toml and BOOKCHAT_ENDPOINT.
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat session.
    Chat,

    /// Ask a single question and print the recommendation.
    Ask {
        /// The question to send.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show saved exchanges for the signed-in user.
    History {
        /// Show another user's history instead.
        #[arg(long, value_name = "USER_ID")]
        user: Option<String>,
    },

    /// Sign in (prompts for anything not given).
    Login {
        /// Stable user id.
        #[arg(long)]
        user_id: Option<String>,

        /// Display name (defaults to the user id).
        #[arg(long)]
        name: Option<String>,

        /// Email address.
        #[arg(long)]
        email: Option<String>,
    },

    /// Sign out.
    Logout,

    /// Show who is signed in.
    Whoami,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
