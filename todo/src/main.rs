//! Todo demo binary
//!
//! Runs the same short session ("buy milk", "walk dog", delete the first
//! row) through every selected architecture and prints the resulting lists
//! as JSON. Exits with an error if any screen ends up with a different list.

use anyhow::{bail, Context};
use serde::Serialize;
use todo_list::config::DEFAULT_LOG_FILTER;
use todo_list::{Architecture, Config, InputPolicy, ScreenOptions, TaskRecord};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION: [&str; 2] = ["buy milk", "walk dog"];
const EXPECTED: [&str; 1] = ["walk dog"];

/// Final state of one screen
#[derive(Debug, Serialize)]
struct Outcome {
    architecture: &'static str,
    policy: InputPolicy,
    rows: Vec<String>,
    tasks: Vec<TaskRecord>,
}

fn run_session(architecture: Architecture, options: &ScreenOptions) -> anyhow::Result<Outcome> {
    let mut screen = architecture.build(options);

    for text in SESSION {
        screen
            .enter(text)
            .with_context(|| format!("{architecture}: adding {text:?}"))?;
        tracing::info!(%architecture, rows = ?screen.rows(), "Added task");
    }

    let removed = screen
        .delete(0)
        .with_context(|| format!("{architecture}: deleting row 0"))?;
    tracing::info!(%architecture, removed = %removed.text, rows = ?screen.rows(), "Deleted task");

    Ok(Outcome {
        architecture: architecture.display_name(),
        policy: screen.policy(),
        rows: screen.rows(),
        tasks: screen.snapshot(),
    })
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?config, "Starting todo demo");

    let options = config.screen_options();
    let mut outcomes = Vec::new();
    let mut diverged = Vec::new();

    for architecture in config.architectures() {
        let outcome = run_session(architecture, &options)?;

        let texts: Vec<&str> = outcome.tasks.iter().map(|task| task.text.as_str()).collect();
        if texts != EXPECTED || outcome.rows != texts {
            tracing::error!(%architecture, ?texts, rows = ?outcome.rows, "Screen diverged");
            diverged.push(outcome.architecture);
        }
        outcomes.push(outcome);
    }

    println!("{}", serde_json::to_string_pretty(&outcomes)?);

    if !diverged.is_empty() {
        bail!("screens diverged from the expected list: {}", diverged.join(", "));
    }

    tracing::info!(screens = outcomes.len(), "All screens agree");
    Ok(())
}
