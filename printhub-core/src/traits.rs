use crate::structs::{HostIdentity, MemorySample, PrinterRecord, ScriptOutput, Session};
use async_trait::async_trait;
use std::borrow::Cow;
use std::fmt;

// 在这里定义所有适配器依赖的 trait，生产实现在 `backends` 中，测试实现在 `backends::mock` 中。

/// 前端资源提供者接口。
#[async_trait]
pub trait UiAssetProvider: Send + Sync {
    /// Retrieves a single UI asset.
    ///
    /// # Arguments
    /// * `path` - The path to the asset (e.g., "templates/index.html", "static/css/style.css").
    ///
    /// # Returns
    /// A `Result` containing a tuple of (`Cow<'static, [u8]>`, `String`)
    /// representing the asset's content and its MIME type, or an `Error` if not found.
    async fn get_asset(&self, path: &str) -> crate::Result<(Cow<'static, [u8]>, String)>;
}

/// Subcommands understood by the privileged script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptCommand {
    WifiStatus,
    IpInfo,
    WifiScan,
    PrinterRemove,
    PrintTest,
    WifiConnect,
    WifiUp,
    ServiceRestart,
    Reboot,
    AptUpdate,
    AptUpgrade,
    SetHostname,
}

impl ScriptCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptCommand::WifiStatus => "wifi_iwconfig",
            ScriptCommand::IpInfo => "ip_info",
            ScriptCommand::WifiScan => "wifi_scan_iwlist",
            ScriptCommand::PrinterRemove => "printer_remove",
            ScriptCommand::PrintTest => "impression_test",
            ScriptCommand::WifiConnect => "wifi_connect",
            ScriptCommand::WifiUp => "wifi_up",
            ScriptCommand::ServiceRestart => "TBerryPrint_restart",
            ScriptCommand::Reboot => "reboot_system",
            ScriptCommand::AptUpdate => "apt_update",
            ScriptCommand::AptUpgrade => "apt_upgrade",
            ScriptCommand::SetHostname => "set_hostname",
        }
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 特权脚本执行接口：`command subcommand [args...]`
///
/// 实现只负责启动进程并收集输出；退出码的含义由调用方解释。
/// 只有进程无法启动（或超时）时才返回 `Err`。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: ScriptCommand, args: &[&str]) -> crate::Result<ScriptOutput>;
}

/// 打印子系统（CUPS）的只读接口
#[async_trait]
pub trait PrintSubsystem: Send + Sync {
    /// Lists every printer queue known to the subsystem, whatever its device.
    async fn printers(&self) -> crate::Result<Vec<PrinterRecord>>;
}

/// 系统指标来源
#[async_trait]
pub trait SystemProbe: Send + Sync {
    /// CPU utilisation over the configured sampling window. Blocks the caller for that window.
    async fn cpu_percent(&self) -> f32;

    async fn memory(&self) -> MemorySample;

    /// Raw output of the temperature utility.
    async fn temperature(&self) -> crate::Result<String>;

    fn host_identity(&self) -> HostIdentity;
}

/// 会话存储接口，以客户端持有的令牌为键
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session and returns its token.
    async fn create(&self, session: Session) -> String;

    /// Returns the live session for `token`, dropping it if it has expired.
    async fn load(&self, token: &str) -> Option<Session>;

    async fn destroy(&self, token: &str);
}
