use crate::traits::UiAssetProvider;
use crate::{Error, Result};
use async_trait::async_trait;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// A UI asset provider that reads files directly from disk, for editing the UI without a rebuild.
pub struct DiskFrontend {
    root: PathBuf,
}

impl DiskFrontend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl UiAssetProvider for DiskFrontend {
    async fn get_asset(&self, path: &str) -> Result<(Cow<'static, [u8]>, String)> {
        // 只接受普通路径分量，拒绝 `..` 和绝对路径
        let relative = Path::new(path);
        if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            tracing::warn!(%path, "Rejected asset path");
            return Err(Error::AssetNotFound(path.to_string()));
        }

        let content = fs::read(self.root.join(relative))
            .await
            .map_err(|_| Error::AssetNotFound(path.to_string()))?;

        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        Ok((Cow::Owned(content), mime))
    }
}
