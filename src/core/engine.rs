use crate::domain::model::{ReleaseContext, ReleaseInfo};
use crate::domain::ports::ReleasePlugin;
use crate::utils::error::Result;
use std::time::Instant;

/// 依序執行 verify 與 publish 兩個階段
pub struct ReleaseEngine<P: ReleasePlugin> {
    plugin: P,
}

impl<P: ReleasePlugin> ReleaseEngine<P> {
    pub fn new(plugin: P) -> Self {
        Self { plugin }
    }

    pub async fn verify(&self, context: &ReleaseContext) -> Result<()> {
        tracing::info!("Verifying release conditions...");
        self.plugin
            .verify_conditions(context)
            .await
            .inspect_err(|e| tracing::error!("❌ Verification failed: {}", e))
    }

    pub async fn run(&self, context: &ReleaseContext) -> Result<ReleaseInfo> {
        let started = Instant::now();
        tracing::info!(
            "Starting release {} ({})",
            context.next_release.git_tag,
            context.next_release.version
        );

        self.verify(context).await?;

        tracing::info!("Publishing release...");
        let info = self
            .plugin
            .publish(context)
            .await
            .inspect_err(|e| tracing::error!("❌ Publish failed: {}", e))?;

        tracing::info!(
            "Published {} at {} in {:?}",
            info.name,
            info.url,
            started.elapsed()
        );
        Ok(info)
    }
}
