use crate::core::assignment::AssignmentSolver;
use crate::core::cost;
use crate::core::transportation::TransportationSolver;
use crate::core::{ConfigProvider, ModelKind, Pipeline, Scenario, SolveReport, Storage};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::Validate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ASSIGNMENT_CSV: &str = "assignment.csv";
pub const TRANSPORTATION_CSV: &str = "transportation.csv";
pub const COST_BREAKDOWN_CSV: &str = "cost_breakdown.csv";
pub const REPORT_JSON: &str = "report.json";

/// Loads a scenario, solves the enabled models and writes the results.
pub struct ScenarioPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ScenarioPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }

    fn render_artifacts(&self, report: &SolveReport) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut artifacts = Vec::new();

        if self.wants("csv") {
            if let Some(plan) = &report.assignment {
                artifacts.push((ASSIGNMENT_CSV, to_csv(&plan.assignments)?));
            }
            if let Some(plan) = &report.transportation {
                artifacts.push((TRANSPORTATION_CSV, to_csv(&plan.shipments)?));
            }
            if let Some(breakdown) = &report.cost {
                artifacts.push((COST_BREAKDOWN_CSV, to_csv(std::slice::from_ref(breakdown))?));
            }
        }

        if self.wants("json") {
            let json = serde_json::to_string_pretty(report)?;
            artifacts.push((REPORT_JSON, json.into_bytes()));
        }

        Ok(artifacts)
    }
}

fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SolverError::IoError(e.into_error()))
}

fn parse_scenario(path: &str, data: &[u8]) -> Result<Scenario> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("json") => Ok(serde_json::from_slice(data)?),
        Some("toml") => {
            let text = std::str::from_utf8(data).map_err(|e| SolverError::ValidationError {
                message: format!("Scenario file '{}' is not valid UTF-8: {}", path, e),
            })?;
            toml::from_str(text).map_err(|e| SolverError::ConfigValidationError {
                field: "scenario".to_string(),
                message: format!("TOML parsing error in '{}': {}", path, e),
            })
        }
        _ => Err(SolverError::InvalidConfigValueError {
            field: "input.scenario".to_string(),
            value: path.to_string(),
            reason: "Scenario files must end in .json or .toml".to_string(),
        }),
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScenarioPipeline<S, C> {
    async fn extract(&self) -> Result<Scenario> {
        let scenario = match self.config.scenario_path() {
            Some(path) => {
                tracing::debug!("Reading scenario from: {}", path);
                let data = self.storage.read_file(path).await?;
                parse_scenario(path, &data)?
            }
            None => {
                tracing::info!("No scenario file given, using the built-in dataset");
                Scenario::default()
            }
        };

        scenario.validate()?;
        Ok(scenario)
    }

    async fn solve(&self, scenario: Scenario) -> Result<SolveReport> {
        let enabled = self.config.enabled_models();
        let mut report = SolveReport {
            scenario_name: scenario.name.clone(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            cost: None,
            assignment: None,
            transportation: None,
        };

        for model in ModelKind::ALL {
            if !enabled.contains(&model) {
                continue;
            }
            tracing::debug!("Running {} model", model);

            match model {
                ModelKind::Cost => {
                    let breakdown = cost::evaluate(&scenario, self.config.cost_inputs())?;
                    tracing::info!("Net cost: {:.2}", breakdown.net_cost);
                    report.cost = Some(breakdown);
                }
                ModelKind::Assignment => {
                    let solver = AssignmentSolver::new(self.config.assignment_options());
                    report.assignment = Some(solver.solve(&scenario)?);
                }
                ModelKind::Transportation => {
                    let solver = TransportationSolver::new(self.config.transportation_options());
                    report.transportation = Some(solver.solve_scenario(&scenario)?);
                }
            }
        }

        Ok(report)
    }

    async fn load(&self, report: SolveReport) -> Result<String> {
        let artifacts = self.render_artifacts(&report)?;

        let Some(archive_name) = self.config.archive_name() else {
            for (name, data) in &artifacts {
                let path = self.output_file(name);
                tracing::debug!("Writing {} ({} bytes)", path, data.len());
                self.storage.write_file(&path, data).await?;
            }
            return Ok(self.config.output_path().to_string());
        };

        tracing::debug!("Creating ZIP file with {} files", artifacts.len());
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &artifacts {
                zip.start_file(*name, SimpleFileOptions::default())?;
                zip.write_all(data)?;
            }
            zip.finish()?.into_inner()
        };

        let output_path = self.output_file(archive_name);
        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(&output_path, &zip_data).await?;

        Ok(output_path)
    }
}
