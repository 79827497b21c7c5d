//! Wi-Fi 适配器
//!
//! 所有操作都通过特权脚本完成：读取当前连接、扫描、连接新网络、启用已知网络。
//! "是否连接过" 通过 NetworkManager 在磁盘上保存的连接配置文件判断。

mod parsing;

pub use parsing::signal_percent;

use crate::config::WifiConfig;
use crate::structs::{WifiNetwork, WifiStatus};
use crate::traits::{CommandRunner, ScriptCommand};
use parsing::{parse_essid, parse_ipv4, parse_scan_cells, DISCONNECTED_ESSID};
use std::path::PathBuf;
use std::sync::Arc;

/// Exit code the connect subcommands use for an authentication failure.
const EXIT_WRONG_PASSWORD: i32 = 1;

/// 连接请求的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A profile for this SSID already exists; nothing was invoked.
    AlreadyConfigured,
    /// The network is up and the print service was restarted.
    Connected,
    WrongPassword,
    /// Any other failure, with the captured error text.
    Failed(String),
}

#[derive(Clone)]
pub struct WifiControl {
    runner: Arc<dyn CommandRunner>,
    profile_dir: PathBuf,
    profile_extension: String,
}

impl WifiControl {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &WifiConfig) -> Self {
        Self {
            runner,
            profile_dir: config.profile_dir.clone(),
            profile_extension: config.profile_extension.clone(),
        }
    }

    /// 当前连接状态；脚本无法执行时视为未连接
    pub async fn current_status(&self) -> WifiStatus {
        let link = match self.runner.run(ScriptCommand::WifiStatus, &[]).await {
            Ok(output) => output.stdout,
            Err(e) => {
                tracing::error!("Failed to read Wi-Fi status: {}", e);
                return WifiStatus::default();
            }
        };

        let ssid = parse_essid(&link).filter(|ssid| ssid != DISCONNECTED_ESSID);
        let Some(ssid) = ssid else {
            return WifiStatus::default();
        };

        let ip_address = match self.runner.run(ScriptCommand::IpInfo, &[]).await {
            Ok(output) => parse_ipv4(&output.stdout),
            Err(e) => {
                tracing::error!("Failed to read IP address: {}", e);
                return WifiStatus::default();
            }
        };

        WifiStatus {
            connected: true,
            ssid: Some(ssid),
            ip_address,
        }
    }

    /// 扫描附近网络，按信号从强到弱排序（稳定排序，同强度保持扫描顺序）
    pub async fn scan_networks(&self) -> Vec<WifiNetwork> {
        let output = match self.runner.run(ScriptCommand::WifiScan, &[]).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Failed to scan Wi-Fi networks: {}", e);
                return Vec::new();
            }
        };

        let mut networks: Vec<WifiNetwork> = parse_scan_cells(&output.stdout)
            .into_iter()
            .map(|cell| WifiNetwork {
                previously_connected: self.has_connected_before(&cell.ssid),
                signal_percent: signal_percent(cell.signal_dbm),
                ssid: cell.ssid,
                signal_dbm: cell.signal_dbm,
                encrypted: cell.encrypted,
            })
            .collect();
        networks.sort_by(|a, b| b.signal_dbm.cmp(&a.signal_dbm));

        tracing::debug!("Scan found {} networks", networks.len());
        networks
    }

    /// `<profile_dir>/<ssid>.<extension>`，SSID 原样拼入路径，不做转义
    ///
    /// 按字符串拼接而不是 `join`：以 `/` 开头的 SSID 仍然落在配置目录之下。
    pub fn profile_path(&self, ssid: &str) -> PathBuf {
        let mut path = self.profile_dir.clone().into_os_string();
        path.push("/");
        path.push(ssid);
        path.push(".");
        path.push(&self.profile_extension);
        PathBuf::from(path)
    }

    pub fn has_connected_before(&self, ssid: &str) -> bool {
        self.profile_path(ssid).is_file()
    }

    /// 连接一个新网络
    pub async fn connect_new(&self, ssid: &str, password: &str) -> ConnectOutcome {
        if self.has_connected_before(ssid) {
            tracing::info!(%ssid, "Profile already exists, skipping connect");
            return ConnectOutcome::AlreadyConfigured;
        }
        tracing::info!(%ssid, "Connecting to new network");
        self.activate(ScriptCommand::WifiConnect, &[ssid, password]).await
    }

    /// 启用一个已知网络
    pub async fn connect_known(&self, ssid: &str) -> ConnectOutcome {
        if self.has_connected_before(ssid) {
            tracing::info!(%ssid, "Profile already exists, skipping activation");
            return ConnectOutcome::AlreadyConfigured;
        }
        tracing::info!(%ssid, "Activating known network");
        self.activate(ScriptCommand::WifiUp, &[ssid]).await
    }

    async fn activate(&self, command: ScriptCommand, args: &[&str]) -> ConnectOutcome {
        let output = match self.runner.run(command, args).await {
            Ok(output) => output,
            Err(e) => return ConnectOutcome::Failed(e.to_string()),
        };

        match output.status {
            Some(0) => {
                // 网络切换后重启打印服务，结果只记录不影响响应
                match self.runner.run(ScriptCommand::ServiceRestart, &[]).await {
                    Ok(restart) if !restart.success() => {
                        tracing::warn!(status = ?restart.status, "Print service restart reported failure")
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Failed to restart print service: {}", e),
                }
                ConnectOutcome::Connected
            }
            Some(EXIT_WRONG_PASSWORD) => ConnectOutcome::WrongPassword,
            _ => ConnectOutcome::Failed(output.stderr),
        }
    }
}
