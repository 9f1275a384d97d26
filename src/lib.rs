pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{cli::LocalStorage, toml_config::RunConfig};

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::core::assignment::{solve_assignment, AssignmentSolver};
pub use crate::core::transportation::TransportationSolver;
pub use crate::core::{engine::SolveEngine, pipeline::ScenarioPipeline};
pub use crate::domain::{model::Scenario, store::ScenarioStore};
pub use crate::utils::error::{Result, SolverError};
