//! Full SDK Demo - Exercises every endpoint
//!
//! Run with: `PARALLEL_API_KEY=your-key cargo run --example full_demo`
//!
//! Set `RUST_LOG=parallel=debug` to see request and poll logs.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parallel::{
    cancel_channel, ChatMessage, ChatRequest, Client, ExtractRequest, RunState, SearchRequest,
    TaskRunRequest, API_KEY_ENV, SDK_VERSION,
};
use serde_json::Value;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const TEST_URL: &str = "https://www.wired.com/category/artificial-intelligence/";
const POLL_INTERVAL: Duration = Duration::from_secs(5);
const TASK_DEADLINE: Duration = Duration::from_secs(15 * 60);

fn header(text: &str) {
    println!();
    println!("{}", format!(" {} ", text).on_blue().bold());
    println!();
}

fn info(label: &str, value: &str) {
    println!("  {}: {}", label.dimmed(), value);
}

fn success(text: &str) {
    println!("{} {}", "✔".green(), text);
}

fn warn(text: &str) {
    println!("{} {}", "⚠".yellow(), text);
}

fn error(text: &str) {
    println!("{} {}", "✖".red(), text);
}

fn print_json(value: &Value) {
    let formatted = serde_json::to_string_pretty(value).unwrap_or_default();
    println!("{}", formatted.dimmed());
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<(), parallel::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if std::env::var(API_KEY_ENV).is_err() {
        error(&format!("{} environment variable is required", API_KEY_ENV));
        return Ok(());
    }

    let client = Client::from_env()?;

    header("Configuration");
    info("SDK Version", SDK_VERSION);
    info("Base URL", client.base_url());
    info("Beta Tag", client.beta_tag());
    info("Timeout", &format!("{:?}", client.timeout()));

    // ========== Search ==========
    header("Search");

    let pb = spinner("Searching...");
    match client
        .search(SearchRequest {
            objective: "Find the latest news on AI.".into(),
            search_queries: vec!["latest AI news".into()],
            max_results: 2,
            max_chars_per_result: 1000,
        })
        .await
    {
        Ok(resp) => {
            pb.finish_and_clear();
            success(&format!("Search ID: {}", resp.search_id));
            for (i, result) in resp.results.iter().enumerate() {
                info(&format!("Result {}", i + 1), &format!("{} ({})", result.title, result.url));
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            warn(&format!("Search failed: {}", e));
        }
    }

    // ========== Extract ==========
    header("Extract");

    let pb = spinner("Extracting...");
    match client
        .extract(ExtractRequest {
            urls: vec![TEST_URL.into()],
            objective: "Extract headlines from the page.".into(),
            excerpts: true,
            full_content: false,
        })
        .await
    {
        Ok(resp) => {
            pb.finish_and_clear();
            success(&format!("Extract ID: {}", resp.extract_id));
            for (i, result) in resp.results.iter().enumerate() {
                info(&format!("Extracted Title {}", i + 1), &result.title);
            }
            for err in &resp.errors {
                warn(&err.message);
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            warn(&format!("Extract failed: {}", e));
        }
    }

    // ========== Tasks ==========
    header("Tasks");

    let pb = spinner("Starting task run...");
    match client
        .run_task(TaskRunRequest {
            input: "What were the key highlights of the latest Apple event?".into(),
            processor: "base".into(),
        })
        .await
    {
        Ok(run) => {
            pb.finish_and_clear();
            let run_id = run.run_id().to_string();
            success(&format!("Run ID: {}", run_id));

            match client.get_task(&run_id).await {
                Ok(task) => info("Current Status", &task.status),
                Err(e) => warn(&format!("Could not fetch task status: {}", e)),
            }

            // Ctrl-C stops the wait without leaving a poller behind
            let (handle, token) = cancel_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    handle.cancel();
                }
            });

            let pb = spinner("Waiting for the run to finish...");
            let result = client
                .poll_until_complete(&run_id, POLL_INTERVAL, token.with_timeout(TASK_DEADLINE))
                .await;
            pb.finish_and_clear();

            match result {
                Ok(task) if task.state() == RunState::Completed => {
                    success("Task completed");
                    print_json(&task.output);
                }
                Ok(task) => {
                    error(&format!("Task finished with status: {}", task.status));
                    print_json(&task.error);
                }
                Err(e) if e.is_cancellation() => warn(&format!("Stopped waiting: {}", e)),
                Err(e) => error(&format!("Polling failed: {}", e)),
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            warn(&format!("Failed to start task: {}", e));
        }
    }

    // ========== Chat ==========
    header("Chat");

    let pb = spinner("Asking...");
    match client
        .chat(ChatRequest {
            model: "speed".into(),
            messages: vec![
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("What is the capital of France?"),
            ],
            ..Default::default()
        })
        .await
    {
        Ok(resp) => {
            pb.finish_and_clear();
            success(&format!("Completion ID: {}", resp.id));
            if let Some(choice) = resp.choices.first() {
                info("Assistant", &choice.message.content);
            }
        }
        Err(e) => {
            pb.finish_and_clear();
            warn(&format!("Chat failed: {}", e));
        }
    }

    println!();
    println!("{}", " Demo Complete ".on_green().bold());
    println!();

    Ok(())
}
