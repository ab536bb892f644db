use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// Runs a pipeline's three phases in order, logging progress.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Extracting data...");
        let raw = self.pipeline.extract().await?;

        tracing::info!("Transforming data...");
        let transformed = self.pipeline.transform(raw).await?;

        tracing::info!("Loading results...");
        let outcome = self.pipeline.load(transformed).await?;
        tracing::info!("Done: {}", outcome);

        Ok(outcome)
    }
}
