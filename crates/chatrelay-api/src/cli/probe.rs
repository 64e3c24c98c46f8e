//! Connectivity check against the inference backend.
//!
//! Sends either the messages given on the command line (one request each)
//! or a few canned conversations, and prints every reply or error. Only the
//! config file and `LM_API_KEY` are needed; LINE credentials are not.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use console::style;

use chatrelay_core::llm::client::InferenceClient;
use chatrelay_infra::config::{Credentials, load_app_config};
use chatrelay_infra::llm::create_backend;
use chatrelay_types::llm::{ChatCompletionRequest, ChatMessage};
use chatrelay_types::turn::Turn;

/// A named conversation sent as one request.
pub struct Scenario {
    pub name: String,
    pub messages: Vec<ChatMessage>,
}

/// Built-in conversations: a self-introduction, a bit of arithmetic, and a
/// follow-up question that only makes sense with the earlier turns.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "self-introduction".to_string(),
            messages: vec![ChatMessage::user("Hello, please briefly introduce yourself.")],
        },
        Scenario {
            name: "arithmetic".to_string(),
            messages: vec![ChatMessage::user("What is 1+1?")],
        },
        Scenario {
            name: "context".to_string(),
            messages: vec![
                ChatMessage::user("Who are you?"),
                Turn::assistant("I am an AI assistant.").into(),
                ChatMessage::user("What can you help me with?"),
            ],
        },
    ]
}

/// One single-message scenario per argument, or the built-ins when empty.
pub fn scenarios_for(messages: &[String]) -> Vec<Scenario> {
    if messages.is_empty() {
        return builtin_scenarios();
    }
    messages
        .iter()
        .enumerate()
        .map(|(i, text)| Scenario {
            name: format!("message {}", i + 1),
            messages: vec![ChatMessage::user(text.as_str())],
        })
        .collect()
}

/// Run the probe. Fails if any request fails.
pub async fn run(data_dir: &Path, messages: &[String], json: bool) -> Result<()> {
    let config = load_app_config(data_dir).await?;
    let api_key = Credentials::from_env().backend_api_key;
    let backend = create_backend(&config.backend, api_key)?;
    let client = InferenceClient::new(
        backend,
        config.backend.model.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    );

    if !json {
        println!();
        println!(
            "  {} Probing {} ({})",
            style("→").bold(),
            style(&config.backend.endpoint).cyan(),
            style(client.model()).dim()
        );
        println!();
    }

    let mut results = Vec::new();
    let mut failures = 0usize;

    for scenario in scenarios_for(messages) {
        let request = ChatCompletionRequest {
            model: client.model().to_string(),
            messages: scenario.messages,
            stream: false,
            temperature: None,
        };
        let outcome = client.send(&request).await;

        if json {
            results.push(match &outcome {
                Ok(reply) => serde_json::json!({"scenario": scenario.name, "ok": true, "reply": reply}),
                Err(e) => serde_json::json!({"scenario": scenario.name, "ok": false, "error": e.to_string()}),
            });
        } else {
            match &outcome {
                Ok(reply) => {
                    println!("  {} {}", style("✓").green().bold(), style(&scenario.name).bold());
                    println!("    {reply}");
                }
                Err(e) => {
                    println!("  {} {}", style("✗").red().bold(), style(&scenario.name).bold());
                    println!("    {}", style(e).red());
                }
            }
            println!();
        }

        if outcome.is_err() {
            failures += 1;
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    if failures > 0 {
        anyhow::bail!("{failures} probe request(s) failed");
    }
    Ok(())
}
