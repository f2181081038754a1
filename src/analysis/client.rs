use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

/// Seam to the external nutrition analysis service.
///
/// Implementations return the service's raw JSON; validation happens in
/// [`super::services`].
#[async_trait]
pub trait NutritionAnalyzer: Send + Sync {
    async fn analyze_image(&self, image: Bytes, mime_type: &str) -> anyhow::Result<Value>;
    async fn analyze_description(&self, description: &str) -> anyhow::Result<Value>;
}
