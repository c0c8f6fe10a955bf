use crate::core::{Pipeline, TransformResult};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use tokio::sync::Mutex;

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub output_path: String,
    pub result: TransformResult,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: Mutex<SystemMonitor>,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: Mutex::new(SystemMonitor::new(monitor_enabled)),
        }
    }

    /// Runs extract, transform and load in sequence. Any stage failure ends
    /// the run; nothing is written unless all stages before load succeeded.
    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting auction scan");

        tracing::info!("📥 Fetching listings...");
        let fragments = self.pipeline.extract().await?;
        tracing::info!("Fetched {} listing fragments", fragments.len());
        self.monitor.lock().await.log_stats("Extract");

        tracing::info!("🔄 Scoring artists...");
        let result = self.pipeline.transform(fragments).await?;
        tracing::info!(
            "Built {} recommendations for {} artists",
            result.rows.len(),
            result.sentiments.len()
        );
        self.monitor.lock().await.log_stats("Transform");

        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Output saved to: {}", output_path);

        let mut monitor = self.monitor.lock().await;
        monitor.log_stats("Load");
        monitor.log_final_stats();

        Ok(RunOutcome {
            output_path,
            result,
        })
    }
}
