use crate::config::UiConfig;
use crate::traits::UiAssetProvider;
use std::sync::Arc;

/// 根据配置选择前端：配置了 `ui.dir` 时从磁盘读取，否则使用内嵌资源
pub fn create_frontend(config: &UiConfig) -> Arc<dyn UiAssetProvider> {
    match &config.dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "💿 Frontend: Disk Provider selected");
            Arc::new(crate::frontends::provider_disk::DiskFrontend::new(dir.clone()))
        }
        None => {
            tracing::info!("📦 Frontend: Embed Provider selected");
            Arc::new(crate::frontends::provider_embed::EmbedFrontend::new())
        }
    }
}
