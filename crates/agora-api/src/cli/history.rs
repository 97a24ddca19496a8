//! CLI access to the stored chat history.
//!
//! These commands talk to the database directly. A running server does not
//! learn about deletions made here until its clients reconnect.

use anyhow::{bail, Result};
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;

use agora_core::repository::MessageStore;

use crate::state::AppState;

/// Print every stored message, oldest first.
pub async fn list_history(state: &AppState, json: bool) -> Result<()> {
    let messages = state.store().list_ordered().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {} No messages stored yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Time").fg(Color::White),
            Cell::new("User").fg(Color::White),
            Cell::new("Text").fg(Color::White),
        ]);

    for m in &messages {
        let user_cell = if m.username == state.config.privileged_username {
            Cell::new(&m.username).fg(Color::Yellow)
        } else {
            Cell::new(&m.username).fg(Color::Cyan)
        };
        table.add_row(vec![
            Cell::new(m.id).fg(Color::DarkGrey),
            Cell::new(m.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            user_cell,
            Cell::new(&m.text),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} message{}",
        style(messages.len()).bold(),
        if messages.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Delete a stored message after confirmation (skipped with `--force`).
pub async fn delete_message(state: &AppState, id: i64, force: bool, json: bool) -> Result<()> {
    let store = state.store();
    let Some(message) = store.get(id).await? else {
        bail!("message {id} not found");
    };

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete message {} from '{}'?",
                id,
                style(&message.username).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let deleted = store.delete_by_id(id).await?;
    tracing::info!(message_id = id, deleted, "message deleted from CLI");

    if json {
        println!("{}", serde_json::json!({"deleted": deleted, "id": id}));
    } else if deleted {
        println!("  {} Message {} deleted.", style("✓").red().bold(), id);
    } else {
        println!("  Message {id} was already gone.");
    }

    Ok(())
}
