//! `log`: list recent exchanges from the audit database.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatrelay_infra::config::{ResolvedPaths, load_app_config};
use chatrelay_infra::sqlite::audit::SqliteAuditLog;
use chatrelay_infra::sqlite::pool::DatabasePool;
use chatrelay_types::audit::AuditRecord;

/// Longest cell text shown in the table before eliding.
const PREVIEW_CHARS: usize = 60;

pub async fn run(data_dir: &Path, user: Option<&str>, limit: u32, json: bool) -> Result<()> {
    let config = load_app_config(data_dir).await?;
    let paths = ResolvedPaths::new(data_dir, &config);

    if !tokio::fs::try_exists(&paths.database).await.unwrap_or(false) {
        anyhow::bail!("no audit database at {}", paths.database.display());
    }
    let pool = DatabasePool::open(&paths.database)
        .await
        .with_context(|| format!("opening {}", paths.database.display()))?;
    let log = SqliteAuditLog::new(pool);
    let records = log.recent(user, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  {}", style("No exchanges recorded yet.").dim());
        println!();
        return Ok(());
    }

    println!();
    println!("{}", render_table(&records));
    println!();
    println!(
        "  {} of {} exchanges",
        style(records.len()).bold(),
        log.count().await?
    );
    println!();

    Ok(())
}

fn render_table(records: &[AuditRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Time").fg(Color::White),
            Cell::new("User").fg(Color::White),
            Cell::new("Kind").fg(Color::White),
            Cell::new("Input").fg(Color::White),
            Cell::new("Reply").fg(Color::White),
        ]);

    for record in records {
        table.add_row(vec![
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S")).fg(Color::DarkGrey),
            Cell::new(&record.user_id),
            Cell::new(record.kind).fg(Color::Cyan),
            Cell::new(preview(&record.input_summary)),
            Cell::new(preview(&record.output_text)),
        ]);
    }
    table
}

/// First line of `text`, cut to [`PREVIEW_CHARS`].
fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS || line.len() < text.trim_end().len() {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        line.to_string()
    }
}
