mod runner;

use anyhow::Context;
use printhub_core::config::{load_config_from_toml_str, AppConfig};
use tracing_subscriber::EnvFilter;

/// 指向覆盖配置文件的环境变量
const CONFIG_ENV: &str = "PRINTHUB_CONFIG";

fn load_config() -> anyhow::Result<AppConfig> {
    let mut config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            tracing::info!(%path, "Loading configuration file");
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {}", path))?;
            load_config_from_toml_str(&raw).with_context(|| format!("invalid config file {}", path))?
        }
        Err(_) => AppConfig::embedded().context("invalid embedded configuration")?,
    };
    config.apply_env_overrides();
    Ok(config)
}

#[tokio::main]
async fn main() {
    // 初始化日志，默认 info 级别，可用 RUST_LOG 覆盖
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = match load_config() {
        Ok(config) => runner::run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
