use crate::domain::model::{Listing, Region};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where listings come from.
///
/// Implementations drop listings outside the sanity bounds and may narrow
/// the result to the region's bounding box, but callers must not rely on
/// an exact radius filter having been applied.
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch(&self, region: &Region) -> Result<Vec<Listing>>;
}
