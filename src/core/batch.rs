use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::adapters::storage::ReportCache;
use crate::core::orchestrator::StatsOrchestrator;
use crate::domain::catalog::RegionCatalog;
use crate::domain::ports::{ListingSource, Storage};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct CityOutcome {
    pub slug: String,
    pub output: String,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct CityFailure {
    pub slug: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<CityOutcome>,
    pub failed: Vec<CityFailure>,
}

impl BatchSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let total_ms: u128 = self.succeeded.iter().map(|o| o.duration.as_millis()).sum();
        json!({
            "succeeded": self.succeeded.iter().map(|o| o.slug.clone()).collect::<Vec<_>>(),
            "failed": self
                .failed
                .iter()
                .map(|f| json!({ "slug": f.slug, "error": f.message }))
                .collect::<Vec<_>>(),
            "total_duration_ms": total_ms as u64,
        })
    }
}

/// Recomputes and caches every catalog city. One city failing is logged and
/// recorded; the others still run.
pub struct BatchRunner<S: ListingSource, W: Storage> {
    orchestrator: Arc<StatsOrchestrator<S>>,
    cache: Arc<ReportCache<W>>,
    concurrency: usize,
}

impl<S, W> BatchRunner<S, W>
where
    S: ListingSource + 'static,
    W: Storage + 'static,
{
    pub fn new(orchestrator: StatsOrchestrator<S>, cache: ReportCache<W>, concurrency: usize) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            cache: Arc::new(cache),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(&self, catalog: &RegionCatalog) -> BatchSummary {
        tracing::info!(
            "Recomputing {} cities with concurrency {}",
            catalog.len(),
            self.concurrency
        );
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let mut slugs = HashMap::new();

        for city in catalog.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let orchestrator = Arc::clone(&self.orchestrator);
            let cache = Arc::clone(&self.cache);
            let slug = city.slug.clone();
            let handle = tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let start = Instant::now();
                let result: Result<String> = async {
                    let report = orchestrator.compute_city(&city).await?;
                    cache.store(&report).await
                }
                .await;
                (city.slug, result, start.elapsed())
            });
            slugs.insert(handle.id(), slug);
        }

        let mut summary = BatchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slug, Ok(output), duration)) => {
                    tracing::info!("✅ {} saved to {} ({:?})", slug, output, duration);
                    summary.succeeded.push(CityOutcome {
                        slug,
                        output,
                        duration,
                    });
                }
                Ok((slug, Err(e), _)) => {
                    tracing::error!("❌ {} failed: {} ({:?})", slug, e, e.category());
                    summary.failed.push(CityFailure {
                        slug,
                        message: e.to_string(),
                    });
                }
                Err(join_error) => {
                    let slug = slugs
                        .remove(&join_error.id())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    tracing::error!("❌ {} task aborted: {}", slug, join_error);
                    summary.failed.push(CityFailure {
                        slug,
                        message: join_error.to_string(),
                    });
                }
            }
        }

        summary.succeeded.sort_by(|a, b| a.slug.cmp(&b.slug));
        summary.failed.sort_by(|a, b| a.slug.cmp(&b.slug));
        tracing::info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded.len(),
            summary.failed.len()
        );
        summary
    }
}
