use std::path::{Path, PathBuf};

use crate::domain::model::CityReport;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.base_path.join(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.base_path.join(path);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

/// City reports stored as pretty-printed `<slug>.json` files.
pub struct ReportCache<W: Storage> {
    storage: W,
}

impl<W: Storage> ReportCache<W> {
    pub fn new(storage: W) -> Self {
        Self { storage }
    }

    pub fn file_name(slug: &str) -> String {
        format!("{}.json", slug)
    }

    /// Returns the file name written.
    pub async fn store(&self, report: &CityReport) -> Result<String> {
        let file_name = Self::file_name(&report.slug);
        let json = serde_json::to_vec_pretty(report)?;
        self.storage.write_file(&file_name, &json).await?;
        Ok(file_name)
    }

    pub async fn load(&self, slug: &str) -> Result<CityReport> {
        let data = self.storage.read_file(&Self::file_name(slug)).await?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::StatsBundle;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_and_load_report() {
        let dir = TempDir::new().unwrap();
        let cache = ReportCache::new(LocalStorage::new(dir.path().join("cities")));

        let mut stats = StatsBundle::empty(Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap());
        stats.count = 42;
        stats.price_per_area = Some(11.5);
        stats.monthly_breakdown = Some(vec![]);
        let report = CityReport {
            slug: "lyon".to_string(),
            name: "Lyon".to_string(),
            country: Some("FRA".to_string()),
            latitude: 45.764,
            longitude: 4.8357,
            radius: 12.0,
            stats,
        };

        let file_name = cache.store(&report).await.unwrap();
        assert_eq!(file_name, "lyon.json");
        assert!(dir.path().join("cities").join("lyon.json").exists());

        let loaded = cache.load("lyon").await.unwrap();
        assert_eq!(loaded, report);
    }

    #[tokio::test]
    async fn test_load_missing_report_is_io_error() {
        let dir = TempDir::new().unwrap();
        let cache = ReportCache::new(LocalStorage::new(dir.path()));
        let err = cache.load("nowhere").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::StatsError::IoError(_)));
    }
}
