use crate::core::assignment::AssignmentOptions;
use crate::core::cost::CostInputs;
use crate::core::transportation::TransportationOptions;
use crate::core::{ConfigProvider, ModelKind};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, validate_positive_number,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_FORMATS: [&str; 2] = ["csv", "json"];
pub const SCENARIO_EXTENSIONS: [&str; 2] = ["json", "toml"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSection,
    pub input: InputConfig,
    pub models: ModelsConfig,
    pub assignment: AssignmentOptions,
    pub transportation: TransportationOptions,
    pub cost_model: CostInputs,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    pub name: String,
    pub description: Option<String>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            name: "ewaste-run".to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Scenario file (`.json` or `.toml`); the built-in dataset when absent.
    pub scenario: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub enabled: Vec<ModelKind>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            enabled: ModelKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub archive: bool,
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            formats: vec!["csv".to_string(), "json".to_string()],
            archive: true,
            archive_name: "solution.zip".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub timing: bool,
    /// `compact` (default) or `json`.
    pub log_format: Option<String>,
}

impl RunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SolverError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SolverError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SolverError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("run.name", &self.run.name)?;
        validate_path("output.output_path", &self.output.output_path)?;

        if let Some(scenario) = &self.input.scenario {
            validate_path("input.scenario", scenario)?;
            validate_file_extensions(
                "input.scenario",
                std::slice::from_ref(scenario),
                &SCENARIO_EXTENSIONS,
            )?;
        }

        if self.models.enabled.is_empty() {
            return Err(SolverError::InvalidConfigValueError {
                field: "models.enabled".to_string(),
                value: "[]".to_string(),
                reason: "Enable at least one of: cost, assignment, transportation".to_string(),
            });
        }

        validate_positive_number(
            "transportation.max_iterations",
            self.transportation.max_iterations,
            1,
        )?;
        self.cost_model.validate()?;

        if self.output.formats.is_empty() {
            return Err(SolverError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: "[]".to_string(),
                reason: "At least one output format is required".to_string(),
            });
        }
        for format in &self.output.formats {
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                return Err(SolverError::InvalidConfigValueError {
                    field: "output.formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        SUPPORTED_FORMATS.join(", ")
                    ),
                });
            }
        }
        if self.output.archive {
            validate_file_extensions(
                "output.archive_name",
                std::slice::from_ref(&self.output.archive_name),
                &["zip"],
            )?;
        }

        if let Some(format) = self
            .monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
        {
            if format != "compact" && format != "json" {
                return Err(SolverError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Use 'compact' or 'json'".to_string(),
                });
            }
        }

        Ok(())
    }

    pub fn timing_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.timing).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }

    pub fn is_enabled(&self, model: ModelKind) -> bool {
        self.models.enabled.contains(&model)
    }
}

impl ConfigProvider for RunConfig {
    fn scenario_path(&self) -> Option<&str> {
        self.input.scenario.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn enabled_models(&self) -> &[ModelKind] {
        &self.models.enabled
    }

    fn assignment_options(&self) -> AssignmentOptions {
        self.assignment.clone()
    }

    fn transportation_options(&self) -> TransportationOptions {
        self.transportation.clone()
    }

    fn cost_inputs(&self) -> &CostInputs {
        &self.cost_model
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn archive_name(&self) -> Option<&str> {
        if self.output.archive {
            Some(&self.output.archive_name)
        } else {
            None
        }
    }
}

impl Validate for RunConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
