use std::fs;
use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use lambda_gate::{handler_fn, Context, Event, Gate, GateMetrics};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

mod config;

use config::RunnerConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = RunnerConfig::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let metrics = GateMetrics::new()?;
    let gate = build_gate(&config, metrics.clone())?;
    let event = read_event(std::env::args().nth(1))?;
    let stage_variables = config.load_stage_variables()?;

    let handler = gate.wrap(handler_fn(|event: Event, context: Context| async move {
        context.succeed(event.into_value());
        Ok(())
    }));

    let outcome = match stage_variables {
        Some(vars) => handler.call_with_stage_variables(event, vars).await,
        None => handler.call(event).await,
    };
    let exposition = metrics.encode()?;
    debug!(metrics = %exposition, "gate metrics");

    match outcome {
        Ok(result) => {
            info!("invocation succeeded");
            println!("{}", serde_json::to_string_pretty(&json!({ "result": result }))?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            warn!(code = err.code(), "invocation failed");
            println!("{}", serde_json::to_string_pretty(&err.to_body())?);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_gate(config: &RunnerConfig, metrics: GateMetrics) -> Result<Gate> {
    let gate = Gate::new().with_metrics(metrics);
    if !config.jwt.is_empty() {
        gate.configure_jwt(config.jwt.clone());
    }
    gate.set_validation_schema(config.load_schema()?);
    info!(
        schema = config.schema_path.is_some(),
        stage_vars = gate.jwt_config().stage_vars,
        "gate configured"
    );
    Ok(gate)
}

fn read_event(path: Option<String>) -> Result<Event> {
    let raw = match path.as_deref() {
        Some("-") | None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read event from stdin")?;
            buffer
        }
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read event from {path}"))?
        }
    };

    let value: Value = serde_json::from_str(&raw).context("event is not valid JSON")?;
    Ok(Event::try_from(value)?)
}
