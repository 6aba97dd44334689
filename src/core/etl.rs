use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting rent-roll report run");

        // Extract
        tracing::info!("📡 Extracting tenant records...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📊 Extracted {} records", raw_data.len());
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🔧 Normalizing rents and computing portfolio stats...");
        let transformed = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "✅ Transformed {} records, {} flagged for review",
            transformed.processed_records.len(),
            transformed.flagged_records.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing report bundle...");
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("📦 Report saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
