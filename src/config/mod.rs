pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::transportation::{InitialMethod, PivotRule, UnbalancedPolicy};
#[cfg(feature = "cli")]
use crate::core::ModelKind;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, SolverError};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use toml_config::{MonitoringConfig, RunConfig};

/// Command-line flags. Flags that are given override the values loaded from `--config`.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "ewaste-optimizer")]
#[command(about = "Optimize e-waste collection and transport plans")]
pub struct CliConfig {
    #[arg(short, long, help = "TOML run configuration")]
    pub config: Option<String>,

    #[arg(long, help = "Scenario file (.json or .toml); built-in dataset when omitted")]
    pub scenario: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Models to solve: cost,assignment,transportation")]
    pub models: Vec<ModelKind>,

    #[arg(long, help = "northwest_corner, least_cost or vogel")]
    pub initial_method: Option<InitialMethod>,

    #[arg(long, help = "dantzig or bland")]
    pub pivot_rule: Option<PivotRule>,

    #[arg(long)]
    pub max_iterations: Option<usize>,

    #[arg(long, help = "Balance supply and demand with a dummy row or column")]
    pub allow_unbalanced: bool,

    #[arg(long, help = "Reject non-square assignment matrices")]
    pub require_square: bool,

    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    #[arg(long, help = "Write loose files instead of a zip archive")]
    pub no_archive: bool,

    #[arg(long, help = "Log per-stage timings")]
    pub timing: bool,

    #[arg(long)]
    pub json_logs: bool,

    #[arg(long, help = "Validate inputs and print the plan without solving")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn into_run_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) if path.trim().is_empty() => {
                return Err(SolverError::MissingConfigError {
                    field: "--config".to_string(),
                });
            }
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(scenario) = self.scenario {
            config.input.scenario = Some(scenario);
        }
        if let Some(output_path) = self.output_path {
            config.output.output_path = output_path;
        }
        if !self.models.is_empty() {
            config.models.enabled = self.models;
        }
        if let Some(method) = self.initial_method {
            config.transportation.initial_method = method;
        }
        if let Some(rule) = self.pivot_rule {
            config.transportation.pivot_rule = rule;
        }
        if let Some(limit) = self.max_iterations {
            config.transportation.max_iterations = limit;
        }
        if self.allow_unbalanced {
            config.transportation.unbalanced = UnbalancedPolicy::Dummy;
        }
        if self.require_square {
            config.assignment.require_square = true;
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats;
        }
        if self.no_archive {
            config.output.archive = false;
        }
        if self.timing || self.json_logs {
            let monitoring = config.monitoring.get_or_insert_with(MonitoringConfig::default);
            monitoring.timing |= self.timing;
            if self.json_logs {
                monitoring.log_format = Some("json".to_string());
            }
        }

        Ok(config)
    }
}
