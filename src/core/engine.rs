use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::StageTimer;

pub struct SolveEngine<P: Pipeline> {
    pipeline: P,
    timing: bool,
}

impl<P: Pipeline> SolveEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            timing: false,
        }
    }

    pub fn new_with_timing(pipeline: P, timing: bool) -> Self {
        Self { pipeline, timing }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<String> {
        let mut timer = StageTimer::new(self.timing);
        tracing::info!("Starting solve run...");

        tracing::info!("Loading scenario...");
        let scenario = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded '{}': {} vehicles, {} zones, {} collection points, {} processing centers",
            scenario.name,
            scenario.vehicles.len(),
            scenario.zones.len(),
            scenario.collection_points.len(),
            scenario.processing_centers.len()
        );
        timer.mark("extract");

        tracing::info!("Solving models...");
        let report = self.pipeline.solve(scenario).await?;
        let solved: Vec<&str> = [
            report.cost.as_ref().map(|_| "cost"),
            report.assignment.as_ref().map(|_| "assignment"),
            report.transportation.as_ref().map(|_| "transportation"),
        ]
        .into_iter()
        .flatten()
        .collect();
        tracing::info!("Solved models: {}", solved.join(", "));
        timer.mark("solve");

        tracing::info!("Writing results...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        timer.mark("load");

        timer.log_final_stats();
        Ok(output_path)
    }
}
