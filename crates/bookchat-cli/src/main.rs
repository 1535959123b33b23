//! bookchat terminal client entry point.
//!
//! Binary name: `bchat`
//!
//! Parses CLI arguments, sets up tracing, wires the collaborators, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,bchat=debug,bookchat_core=debug,bookchat_infra=debug",
        _ => "trace",
    };
    bookchat_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "bchat", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    bookchat_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init(cli.endpoint.clone()).await?;

    match cli.command {
        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state, cli.quiet).await?;
        }

        Commands::Ask { query } => {
            cli::ask::ask(&state, &query.join(" "), cli.json, cli.quiet).await?;
        }

        Commands::History { user } => {
            cli::history::show_history(&state, user, cli.json).await?;
        }

        Commands::Login {
            user_id,
            name,
            email,
        } => {
            cli::auth::login(&state, user_id, name, email, cli.json).await?;
        }

        Commands::Logout => {
            cli::auth::logout(&state, cli.json).await?;
        }

        Commands::Whoami => {
            cli::auth::whoami(&state, cli.json)?;
        }

        // Handled before state init.
        Commands::Completions { .. } => {}
    }

    Ok(())
}
