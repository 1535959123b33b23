//! Sign-in, sign-out and identity display commands.

use anyhow::{Result, bail};
use console::style;
use dialoguer::Input;

use bookchat_core::session::store::SessionStore;
use bookchat_types::error::AuthError;
use bookchat_types::identity::{Identity, SignInRequest};

use crate::state::AppState;

/// Sign in, prompting for the user id (and then the display name) when
/// `--user-id` was not given.
pub async fn login(
    state: &AppState,
    user_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
    json: bool,
) -> Result<()> {
    let (user_id, display_name) = match user_id {
        Some(id) => (id, name),
        None => {
            if !console::user_attended() {
                bail!("--user-id is required when not running in a terminal");
            }
            let id = Input::<String>::new()
                .with_prompt("User id")
                .interact_text()
                .map_err(|_| AuthError::Cancelled)?;
            let display_name = match name {
                Some(n) => Some(n),
                None => Some(
                    Input::<String>::new()
                        .with_prompt("Display name")
                        .default(id.trim().to_string())
                        .interact_text()
                        .map_err(|_| AuthError::Cancelled)?,
                ),
            };
            (id, display_name)
        }
    };

    let identity = state
        .session
        .sign_in(&SignInRequest {
            user_id,
            display_name,
            email,
        })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&identity)?);
    } else {
        println!();
        println!(
            "  {} Signed in as {} ({})",
            style("✓").green().bold(),
            style(&identity.display_name).cyan().bold(),
            style(&identity.user_id).dim()
        );
        println!();
    }
    Ok(())
}

pub async fn logout(state: &AppState, json: bool) -> Result<()> {
    let previous = state.session.current();
    state.session.sign_out().await?;

    if json {
        println!("{}", serde_json::json!({ "signed_out": previous.is_some() }));
    } else if let Some(identity) = previous {
        println!();
        println!(
            "  {} Signed out {}",
            style("✓").green().bold(),
            style(&identity.display_name).cyan()
        );
        println!();
    } else {
        println!();
        println!("  {} Not signed in.", style("i").blue().bold());
        println!();
    }
    Ok(())
}

pub fn whoami(state: &AppState, json: bool) -> Result<()> {
    let current = state.session.current();

    if json {
        println!("{}", serde_json::to_string_pretty(&current)?);
        return Ok(());
    }

    println!();
    match current {
        Some(identity) => print_identity(&identity),
        None => println!(
            "  {} Not signed in. Sign in with: {}",
            style("i").blue().bold(),
            style("bchat login").yellow()
        ),
    }
    println!(
        "  {}  {}",
        style("Data:").bold(),
        style(state.data_dir.display()).dim()
    );
    println!();
    Ok(())
}

fn print_identity(identity: &Identity) {
    println!(
        "  {}  {}",
        style("User:").bold(),
        style(&identity.display_name).cyan().bold()
    );
    println!("  {}    {}", style("Id:").bold(), identity.user_id);
    if let Some(email) = &identity.email {
        println!("  {} {}", style("Email:").bold(), email);
    }
    println!(
        "  {} {}",
        style("Since:").bold(),
        style(identity.signed_in_at.format("%Y-%m-%d %H:%M UTC")).dim()
    );
}
