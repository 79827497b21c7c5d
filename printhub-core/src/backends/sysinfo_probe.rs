use crate::config::MetricsConfig;
use crate::structs::{HostIdentity, MemorySample};
use crate::traits::SystemProbe;
use crate::{Error, Result};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::time::Duration;
use sysinfo::System;
use tokio::process::Command;

/// 基于 sysinfo 的系统指标来源，温度通过外部命令读取
#[derive(Debug, Clone)]
pub struct SysinfoProbe {
    cpu_window: Duration,
    temperature_command: Vec<String>,
}

impl SysinfoProbe {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            // sysinfo 要求两次刷新之间至少间隔 MINIMUM_CPU_UPDATE_INTERVAL
            cpu_window: config
                .cpu_sample_window()
                .max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
            temperature_command: config.temperature_command.clone(),
        }
    }
}

/// 通过一个不会真正发包的 UDP "连接" 找出默认出口地址
fn local_ip() -> IpAddr {
    let fallback = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let Ok(socket) = UdpSocket::bind("0.0.0.0:0") else {
        return fallback;
    };
    if socket.connect("10.254.254.254:1").is_err() {
        return fallback;
    }
    socket.local_addr().map(|addr| addr.ip()).unwrap_or(fallback)
}

#[async_trait]
impl SystemProbe for SysinfoProbe {
    async fn cpu_percent(&self) -> f32 {
        // 每次采样都使用独立的 System，请求之间没有共享状态
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        tokio::time::sleep(self.cpu_window).await;
        sys.refresh_cpu_usage();
        sys.global_cpu_usage()
    }

    async fn memory(&self) -> MemorySample {
        let mut sys = System::new();
        sys.refresh_memory();
        let total = sys.total_memory();
        let available = sys.available_memory();
        let percent = if total == 0 {
            0.0
        } else {
            (total.saturating_sub(available)) as f32 / total as f32 * 100.0
        };
        MemorySample {
            total_bytes: total,
            used_bytes: sys.used_memory(),
            percent,
        }
    }

    async fn temperature(&self) -> Result<String> {
        let Some((program, args)) = self.temperature_command.split_first() else {
            return Err(Error::CommandFailed("no temperature command configured".into()));
        };
        let output = Command::new(program).args(args).output().await?;
        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CommandFailed(format!("{} failed: {}", program, err.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn host_identity(&self) -> HostIdentity {
        HostIdentity {
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            ip_address: local_ip().to_string(),
        }
    }
}
