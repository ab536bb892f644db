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

pub trait ConfigProvider: Send + Sync {
    fn page_size(&self) -> usize;
    fn max_pages(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Raw: Send;
    type Transformed: Send;

    async fn extract(&self) -> Result<Self::Raw>;
    async fn transform(&self, data: Self::Raw) -> Result<Self::Transformed>;
    async fn load(&self, result: Self::Transformed) -> Result<String>;
}
