use crate::traits::{CommandRunner, ScriptCommand};
use std::sync::Arc;

/// 主机名只允许字母和数字
pub fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty() && hostname.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Reboot, package update and hostname change. All of these end in a reboot, so results are
/// only logged.
#[derive(Clone)]
pub struct SystemControl {
    runner: Arc<dyn CommandRunner>,
}

impl SystemControl {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Runs one step, logging the outcome. Later steps run regardless.
    async fn run_step(&self, command: ScriptCommand, args: &[&str]) {
        match self.runner.run(command, args).await {
            Ok(output) if output.success() => tracing::info!(%command, "System step finished"),
            Ok(output) => tracing::warn!(%command, status = ?output.status, "System step failed"),
            Err(e) => tracing::error!(%command, "System step could not run: {}", e),
        }
    }

    pub async fn reboot(&self) {
        self.run_step(ScriptCommand::Reboot, &[]).await;
    }

    pub async fn update_and_reboot(&self) {
        self.run_step(ScriptCommand::AptUpdate, &[]).await;
        self.run_step(ScriptCommand::AptUpgrade, &[]).await;
        self.reboot().await;
    }

    /// 设置主机名并重启；主机名不合法时什么都不做，返回 false
    pub async fn set_hostname_and_reboot(&self, hostname: &str) -> bool {
        if !is_valid_hostname(hostname) {
            tracing::warn!(%hostname, "Rejected invalid hostname");
            return false;
        }
        self.run_step(ScriptCommand::SetHostname, &[hostname]).await;
        self.reboot().await;
        true
    }
}
