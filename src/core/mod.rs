pub mod assignment;
pub mod cost;
pub mod engine;
pub mod pipeline;
pub mod transportation;

pub use crate::domain::model::{Scenario, SolveReport};
pub use crate::domain::ports::{ConfigProvider, ModelKind, Pipeline, Storage};
pub use crate::utils::error::Result;
