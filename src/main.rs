use anyhow::Context;
use clap::Parser;
use ewaste_optimizer::core::{ConfigProvider, Pipeline};
use ewaste_optimizer::utils::error::{ErrorSeverity, SolverError};
use ewaste_optimizer::utils::{logger, validation::Validate};
use ewaste_optimizer::{CliConfig, LocalStorage, RunConfig, ScenarioPipeline, SolveEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    let verbose = cli.verbose;
    let dry_run = cli.dry_run;

    let config = cli
        .into_run_config()
        .context("Failed to load the run configuration")?;

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting ewaste-optimizer ({})", config.run.name);
    if verbose {
        tracing::debug!("Run config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let timing = config.timing_enabled();
    let storage = LocalStorage::new(".".to_string());
    let pipeline = ScenarioPipeline::new(storage, config);

    if dry_run {
        return match describe_plan(&pipeline).await {
            Ok(()) => Ok(()),
            Err(e) => exit_with(e),
        };
    }

    let engine = SolveEngine::new_with_timing(pipeline, timing);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Solve completed successfully!");
            println!("✅ Solve completed successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

async fn describe_plan(pipeline: &ScenarioPipeline<LocalStorage, RunConfig>) -> Result<(), SolverError> {
    let scenario = pipeline.extract().await?;
    let config = pipeline.config();

    println!("Scenario: {}", scenario.name);
    println!(
        "  {} vehicles, {} zones, {} collection points, {} processing centers",
        scenario.vehicles.len(),
        scenario.zones.len(),
        scenario.collection_points.len(),
        scenario.processing_centers.len()
    );
    let (supply, demand) = (scenario.total_supply()?, scenario.total_demand()?);
    println!(
        "  supply {} / demand {}{}",
        supply,
        demand,
        if supply == demand {
            ""
        } else {
            " (unbalanced)"
        }
    );

    let models: Vec<String> = config
        .enabled_models()
        .iter()
        .map(|m| m.to_string())
        .collect();
    println!("Models: {}", models.join(", "));

    let options = config.transportation_options();
    println!(
        "Transportation: initial={} pivot={:?} max_iterations={} unbalanced={:?}",
        options.initial_method, options.pivot_rule, options.max_iterations, options.unbalanced
    );
    match config.archive_name() {
        Some(name) => println!("Output: {}/{}", config.output_path(), name),
        None => println!(
            "Output: {} ({})",
            config.output_path(),
            config.output_formats().join(", ")
        ),
    }

    Ok(())
}

fn exit_with(e: SolverError) -> ! {
    tracing::error!(
        "❌ Solve failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
