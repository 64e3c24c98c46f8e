//! `check-config`: validate configuration and prompts without starting.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatrelay_infra::config::{
    Credentials, ENV_ACCESS_TOKEN, ENV_API_KEY, ENV_CHANNEL_SECRET, ResolvedPaths,
    load_app_config, load_prompt_catalog,
};

/// Load config and prompts and print a summary. Errors propagate so the
/// process exits non-zero.
pub async fn run(data_dir: &Path, json: bool) -> Result<()> {
    let config = load_app_config(data_dir).await?;
    let paths = ResolvedPaths::new(data_dir, &config);
    let catalog = load_prompt_catalog(&paths.prompts).await?;
    let prompts = catalog.prompts();

    let credentials = Credentials::from_env();
    let secrets = [
        (ENV_CHANNEL_SECRET, credentials.channel_secret.is_some()),
        (ENV_ACCESS_TOKEN, credentials.access_token.is_some()),
        (ENV_API_KEY, credentials.backend_api_key.is_some()),
    ];

    if json {
        let secrets: serde_json::Map<String, serde_json::Value> = secrets
            .iter()
            .map(|(key, set)| (key.to_string(), serde_json::Value::Bool(*set)))
            .collect();
        let summary = serde_json::json!({
            "data_dir": data_dir.display().to_string(),
            "config": config,
            "paths": {
                "prompts": paths.prompts.display().to_string(),
                "upload_dir": paths.upload_dir.display().to_string(),
                "database": paths.database.display().to_string(),
            },
            "reset_commands": prompts.reset_commands,
            "secrets": secrets,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Setting").fg(Color::White),
            Cell::new("Value").fg(Color::White),
        ]);

    let rows = [
        ("data dir", data_dir.display().to_string()),
        ("listen", format!("{}:{}", config.server.host, config.server.port)),
        ("endpoint", config.backend.endpoint.clone()),
        ("model", config.backend.model.clone()),
        ("timeout", format!("{}s", config.backend.timeout_secs)),
        ("image temperature", config.backend.image_temperature.to_string()),
        ("max history", config.session.max_history.to_string()),
        ("prompts", paths.prompts.display().to_string()),
        ("upload dir", paths.upload_dir.display().to_string()),
        ("database", paths.database.display().to_string()),
        ("reset commands", prompts.reset_commands.join(", ")),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    for (key, set) in secrets {
        let value = if set {
            Cell::new("set").fg(Color::Green)
        } else {
            Cell::new("unset").fg(Color::Yellow)
        };
        table.add_row(vec![Cell::new(key), value]);
    }

    println!();
    println!("{table}");
    println!();
    println!("  {} Configuration is valid", style("✓").green().bold());
    if credentials.channel_secret.is_none() || credentials.access_token.is_none() {
        println!(
            "  {} LINE credentials are missing; `serve` will refuse to start",
            style("!").yellow().bold()
        );
    }
    println!();

    Ok(())
}
