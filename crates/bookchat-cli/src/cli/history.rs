//! `bchat history`: list saved exchanges.

use anyhow::{Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use bookchat_core::history::repository::HistoryRepository;
use bookchat_core::session::store::SessionStore;
use bookchat_types::chat::ExchangeRecord;
use bookchat_types::identity::UserId;

use crate::state::AppState;

const PREVIEW_CHARS: usize = 60;

pub async fn show_history(state: &AppState, user: Option<String>, json: bool) -> Result<()> {
    let user_id = match (user, state.session.current()) {
        (Some(user), _) => UserId::new(user.trim()),
        (None, Some(identity)) => identity.user_id,
        (None, None) => bail!("Not signed in. Sign in with `bchat login` or pass --user."),
    };

    let records = state.history.list_all(&user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No saved exchanges for {}. Start one with: {}",
            style("i").blue().bold(),
            style(&user_id).cyan(),
            style("bchat chat").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", history_table(&records));
    println!();
    println!(
        "  {} exchange{}",
        style(records.len()).bold(),
        if records.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn history_table(records: &[ExchangeRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("When").fg(Color::White),
        Cell::new("Query").fg(Color::White),
        Cell::new("Recommendation").fg(Color::White),
    ]);

    for record in records {
        let response = match &record.response {
            Some(text) => Cell::new(preview(text)),
            None => Cell::new("(no reply)").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M")).fg(Color::DarkGrey),
            Cell::new(preview(&record.query)).fg(Color::Cyan),
            response,
        ]);
    }
    table
}

/// First line of `text`, cut to `PREVIEW_CHARS` characters.
fn preview(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    let truncated = first_line.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some();
    let mut out: String = first_line.chars().take(PREVIEW_CHARS - 3).collect();
    if truncated {
        out.push_str("...");
        out
    } else {
        first_line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("Try Dune"), "Try Dune");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(100);
        let out = preview(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_preview_uses_first_line() {
        assert_eq!(preview("Try Dune\nIt has sandworms"), "Try Dune...");
    }

    #[test]
    fn test_history_table_has_row_per_record() {
        let at = Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0).unwrap();
        let records = vec![
            ExchangeRecord::new(UserId::new("u1"), "sci-fi books", Some("Try Dune".into()), at),
            ExchangeRecord::new(UserId::new("u1"), "orphan", None, at),
        ];
        let table = history_table(&records);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("Try Dune"));
        assert!(rendered.contains("(no reply)"));
    }
}
