use std::io::Write;

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use byblia_client::{
    discovery_candidates, BybliaClient, ChatEvent, ChatMessage, ClientConfig, ClientError,
};
use byblia_core::utils::truncate_chars;

use crate::cli::TargetArgs;

const PROMPT_COLUMN_CHARS: usize = 48;

async fn connect(target: TargetArgs) -> Result<BybliaClient> {
    connect_with(target, &discovery_candidates()).await
}

async fn connect_with(target: TargetArgs, candidates: &[String]) -> Result<BybliaClient> {
    match target.url {
        Some(base_url) => {
            let config = ClientConfig { base_url, origin: target.origin, ..ClientConfig::default() };
            Ok(BybliaClient::new(config)?)
        },
        None => BybliaClient::discover(candidates, target.origin)
            .await
            .context("No Byblia server found; start one with `byblia-server serve` or pass --url"),
    }
}

pub async fn handle_ask(
    question: Option<String>,
    interactive: bool,
    target: TargetArgs,
) -> Result<()> {
    let client = connect(target).await?;

    if !interactive {
        let question =
            question.context("Provide a question or start a conversation with --interactive")?;
        ask_once(&client, &question, None).await?;
        return Ok(());
    }

    println!("{}", "Byblia - type 'exit' or 'quit' to leave".cyan().bold());
    let mut history = None;
    if let Some(question) = question {
        history = report(ask_once(&client, &question, None).await, history);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{} ", "You:".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let outcome = ask_once(&client, line, history.clone()).await;
        history = report(outcome, history);
    }

    println!("{}", "Goodbye.".cyan());
    Ok(())
}

/// Keep the previous context when a turn fails.
fn report(
    outcome: Result<Option<Vec<ChatMessage>>>,
    previous: Option<Vec<ChatMessage>>,
) -> Option<Vec<ChatMessage>> {
    match outcome {
        Ok(history) => history.or(previous),
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(ClientError::RateLimited { retry_after }) => eprintln!(
                    "{} wait {}s before asking again",
                    "rate limited:".yellow().bold(),
                    retry_after.unwrap_or(60)
                ),
                _ => eprintln!("{} {}", "error:".red().bold(), e),
            }
            previous
        },
    }
}

async fn ask_once(
    client: &BybliaClient,
    question: &str,
    history: Option<Vec<ChatMessage>>,
) -> Result<Option<Vec<ChatMessage>>> {
    let mut events = client.chat_stream(question, history).await?;
    let mut next_history = None;

    print!("{} ", "Byblia:".cyan().bold());
    while let Some(event) = events.next().await {
        match event? {
            ChatEvent::Chunk(text) => {
                print!("{}", text);
                std::io::stdout().flush()?;
            },
            ChatEvent::Complete(done) => {
                println!();
                let meta = format!(
                    "tokens: {} | temperature: {:.2} | interaction: {}",
                    done.token_usage, done.temperature, done.interaction_id
                );
                println!("{}", meta.dimmed());
                next_history = done.message_history;
            },
            ChatEvent::Error(message) => {
                println!();
                eprintln!("{} {}", "error:".red().bold(), message);
            },
        }
    }

    Ok(next_history)
}

pub async fn handle_interactions(limit: u32, json: bool, target: TargetArgs) -> Result<()> {
    let client = connect(target).await?;
    let records = client.recent_interactions(limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{}", "No interactions recorded yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "When", "Model", "Tokens", "Feedback", "Prompt"]);

    for record in &records {
        let feedback = match record.user_feedback {
            Some(true) => Cell::new("👍").fg(Color::Green),
            Some(false) => Cell::new("👎").fg(Color::Red),
            None => Cell::new("-"),
        };

        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M")),
            Cell::new(&record.model),
            Cell::new(record.token_usage),
            feedback,
            Cell::new(truncate_chars(&record.user_prompt, PROMPT_COLUMN_CHARS)),
        ]);
    }

    println!("{table}");
    println!("\n{} interactions shown", records.len());
    Ok(())
}
