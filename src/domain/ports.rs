use crate::core::assignment::AssignmentOptions;
use crate::core::cost::CostInputs;
use crate::core::transportation::TransportationOptions;
use crate::domain::model::{Scenario, SolveReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Cost,
    Assignment,
    Transportation,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [
        ModelKind::Cost,
        ModelKind::Assignment,
        ModelKind::Transportation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Cost => "cost",
            ModelKind::Assignment => "assignment",
            ModelKind::Transportation => "transportation",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cost" | "cost_minimization" => Ok(ModelKind::Cost),
            "assignment" => Ok(ModelKind::Assignment),
            "transportation" | "transport" => Ok(ModelKind::Transportation),
            other => Err(format!(
                "unknown model '{}', expected one of: cost, assignment, transportation",
                other
            )),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    /// Scenario file to load; `None` means the built-in dataset.
    fn scenario_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn enabled_models(&self) -> &[ModelKind];
    fn assignment_options(&self) -> AssignmentOptions;
    fn transportation_options(&self) -> TransportationOptions;
    fn cost_inputs(&self) -> &CostInputs;
    fn output_formats(&self) -> &[String];
    /// Archive file name, or `None` to write loose files.
    fn archive_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Scenario>;
    async fn solve(&self, scenario: Scenario) -> Result<SolveReport>;
    async fn load(&self, report: SolveReport) -> Result<String>;
}
