use serde::{Deserialize, Serialize};
use std::process::Output;

/// 登录后的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

/// 服务端会话记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    pub role: Role,
}

impl Session {
    pub fn new(role: Role) -> Self {
        Self {
            logged_in: true,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.logged_in && self.role == Role::Admin
    }
}

/// 表示扫描到的单个 Wi-Fi 网络
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiNetwork {
    pub ssid: String,
    #[serde(rename = "signal_level")]
    pub signal_dbm: i32,
    pub signal_percent: u8, // 信号强度，0到100
    pub encrypted: bool,
    #[serde(rename = "hasConnected")]
    pub previously_connected: bool,
}

/// 当前 Wi-Fi 连接状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WifiStatus {
    pub connected: bool,
    pub ssid: Option<String>,
    pub ip_address: Option<String>,
}

/// 从 CUPS 读取到的一台打印机
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterRecord {
    pub name: String,
    pub device_uri: String,
    pub state: i32,
}

/// A USB printer as shown by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Printer {
    pub name: String,
    pub state_code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusIcon {
    pub class: &'static str,
    pub color: &'static str,
}

/// `/stats` 返回的单台打印机
#[derive(Debug, Clone, Serialize)]
pub struct PrinterView {
    pub name: String,
    pub status: i32,
    pub status_text: &'static str,
    pub status_icon: StatusIcon,
}

/// `/stats` 的响应体
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cpu_percent: String,
    pub raw_cpu_percent: f32,
    pub temperature: String,
    pub ram_used: String,
    pub ram_percent: String,
    pub raw_ram_percent: f32,
    pub printers: Vec<PrinterView>,
}

/// `/api/wifi_networks` 的响应体
#[derive(Debug, Clone, Serialize)]
pub struct WifiNetworksResponse {
    pub networks: Vec<WifiNetwork>,
    pub current_status: WifiStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySample {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub percent: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip_address: String,
}

/// 特权脚本的一次执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOutput {
    /// `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    pub fn with_status(status: i32) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

impl From<Output> for ScriptOutput {
    fn from(output: Output) -> Self {
        Self {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// 登录表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// `/setup_wifi` 与 `/setup_wifi_connected` 的表单
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WifiForm {
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostnameForm {
    #[serde(default)]
    pub hostname: Option<String>,
}
