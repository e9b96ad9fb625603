use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use lambda_gate::{JwtOptions, Schema, StageVariables};

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub jwt: JwtOptions,
    pub schema_path: Option<PathBuf>,
    pub stage_variables_path: Option<PathBuf>,
    pub log_filter: String,
}

impl RunnerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let stage_vars = var("GATE_JWT_STAGE_VARS")
            .map(|value| parse_bool(&value).context("GATE_JWT_STAGE_VARS must be true or false"))
            .transpose()?;
        let leeway_seconds = var("GATE_JWT_LEEWAY_SECONDS")
            .map(|value| {
                value
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("GATE_JWT_LEEWAY_SECONDS is not a number: '{value}'"))
            })
            .transpose()?;

        let jwt = JwtOptions {
            algorithm: var("GATE_JWT_ALGORITHM"),
            secret: var("GATE_JWT_SECRET"),
            token_name: var("GATE_JWT_TOKEN_NAME"),
            stage_vars,
            leeway_seconds,
        };

        Ok(Self {
            jwt,
            schema_path: var("GATE_SCHEMA_PATH").map(PathBuf::from),
            stage_variables_path: var("GATE_STAGE_VARIABLES_PATH").map(PathBuf::from),
            log_filter: var("GATE_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn load_schema(&self) -> Result<Option<Schema>> {
        let Some(path) = &self.schema_path else {
            return Ok(None);
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read schema from {}", path.display()))?;
        let schema = serde_json::from_str(&raw)
            .with_context(|| format!("invalid schema in {}", path.display()))?;
        Ok(Some(schema))
    }

    pub fn load_stage_variables(&self) -> Result<Option<StageVariables>> {
        let Some(path) = &self.stage_variables_path else {
            return Ok(None);
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read stage variables from {}", path.display()))?;
        let vars = serde_json::from_str(&raw)
            .with_context(|| format!("invalid stage variables in {}", path.display()))?;
        Ok(Some(vars))
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("unrecognised boolean '{other}'")),
    }
}
