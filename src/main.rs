use anyhow::Context;
use clap::Parser;
use rent_stats::utils::error::ErrorSeverity;
use rent_stats::utils::{logger, validation::Validate};
use rent_stats::{CliConfig, CsvListingSource, StatsOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let region = config.region();
    let source = CsvListingSource::new(&config.listings, config.bounds());
    let orchestrator = StatsOrchestrator::new(source, config.histogram_settings());

    let bundle = match orchestrator.compute_stats(&region, config.stats_options()).await {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!(
                "❌ Statistics failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    tracing::info!(
        "✅ {} listings, price per area {:?}",
        bundle.count,
        bundle.price_per_area
    );

    let json = serde_json::to_string_pretty(&bundle)?;
    match &config.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path))?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
