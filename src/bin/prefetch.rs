use anyhow::Context;
use clap::Parser;
use rent_stats::utils::{logger, validation::Validate};
use rent_stats::domain::catalog::slugify;
use rent_stats::{AppConfig, BatchRunner, LocalStorage, RegionCatalog, ReportCache, StatsOrchestrator};

#[derive(Parser)]
#[command(name = "prefetch")]
#[command(about = "Recompute and cache statistics for every city in the catalog")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "rent-stats.toml")]
    config: String,

    /// Override the number of cities computed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Only compute the named cities (name or slug)
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// List the cities that would be computed and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Loading configuration from: {}", args.config);
    let mut config = AppConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if let Some(concurrency) = args.concurrency {
        config.batch.concurrency = concurrency;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let mut catalog = config.load_catalog().context("failed to load the city catalog")?;
    if !args.only.is_empty() {
        let wanted: Vec<String> = args.only.iter().map(|name| slugify(name)).collect();
        let selected = catalog
            .iter()
            .filter(|c| wanted.contains(&c.slug))
            .map(|c| c.city.clone())
            .collect();
        catalog = RegionCatalog::new(selected);
    }

    if args.dry_run {
        for city in catalog.iter() {
            println!(
                "{} ({}) radius {:?} km, {} neighborhoods",
                city.city.name,
                city.slug,
                city.region().radius_km,
                city.neighborhoods.len()
            );
        }
        return Ok(());
    }

    let source = config.build_source()?;
    let orchestrator = StatsOrchestrator::new(source, config.histogram_settings());
    let cache = ReportCache::new(LocalStorage::new(&config.output.cache_dir));
    let runner = BatchRunner::new(orchestrator, cache, config.concurrency());

    let summary = runner.run(&catalog).await;
    println!("{}", serde_json::to_string_pretty(&summary.to_json())?);

    if !summary.is_complete() {
        std::process::exit(2);
    }
    Ok(())
}
