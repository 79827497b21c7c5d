use crate::structs::{HostIdentity, MemorySample, PrinterRecord, ScriptOutput};
use crate::traits::{CommandRunner, PrintSubsystem, ScriptCommand, SystemProbe};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

// 不接触真实硬件的模拟后端：用于开发机调试（daemon 的 backend_mock 特性）和测试。

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One recorded invocation of the privileged script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: ScriptCommand,
    pub args: Vec<String>,
}

/// A script runner that returns canned output and records every call.
/// Commands without a canned response succeed with empty output.
#[derive(Debug, Default)]
pub struct MockCommandRunner {
    responses: Mutex<HashMap<ScriptCommand, ScriptOutput>>,
    spawn_failures: Mutex<HashSet<ScriptCommand>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, command: ScriptCommand, output: ScriptOutput) -> Self {
        self.set_response(command, output);
        self
    }

    pub fn with_stdout(self, command: ScriptCommand, stdout: &str) -> Self {
        self.with_response(
            command,
            ScriptOutput {
                status: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        )
    }

    /// Makes `command` fail as if the script could not be started.
    pub fn with_spawn_failure(self, command: ScriptCommand) -> Self {
        lock(&self.spawn_failures).insert(command);
        self
    }

    pub fn set_response(&self, command: ScriptCommand, output: ScriptOutput) {
        lock(&self.responses).insert(command, output);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    pub fn invoked(&self, command: ScriptCommand) -> bool {
        lock(&self.calls).iter().any(|call| call.command == command)
    }

    /// 开发模式使用的样例输出
    pub fn demo() -> Self {
        Self::new()
            .with_stdout(
                ScriptCommand::WifiStatus,
                "wlan0     IEEE 802.11  ESSID:\"MyHomeWiFi\"\n          Mode:Managed  Frequency:2.437 GHz\n",
            )
            .with_stdout(
                ScriptCommand::IpInfo,
                "3: wlan0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500\n    inet 192.168.1.42/24 brd 192.168.1.255 scope global dynamic wlan0\n",
            )
            .with_stdout(ScriptCommand::WifiScan, DEMO_SCAN)
    }
}

const DEMO_SCAN: &str = "wlan0     Scan completed :
          Cell 01 - Address: AA:BB:CC:DD:EE:01
                    ESSID:\"MyHomeWiFi\"
                    Quality=60/70  Signal level=-45 dBm
                    Encryption key:on
          Cell 02 - Address: AA:BB:CC:DD:EE:02
                    ESSID:\"CafeGuest\"
                    Quality=40/70  Signal level=-68 dBm
                    Encryption key:off
          Cell 03 - Address: AA:BB:CC:DD:EE:03
                    ESSID:\"Neighbor's Network\"
                    Quality=20/70  Signal level=-84 dBm
                    Encryption key:on
";

#[async_trait]
impl CommandRunner for MockCommandRunner {
    async fn run(&self, command: ScriptCommand, args: &[&str]) -> Result<ScriptOutput> {
        tracing::info!("🤖 [MockCommandRunner] {} ({} args)", command, args.len());
        lock(&self.calls).push(RecordedCall {
            command,
            args: args.iter().map(|arg| arg.to_string()).collect(),
        });

        if lock(&self.spawn_failures).contains(&command) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Simulated script spawn failure",
            )));
        }
        Ok(lock(&self.responses)
            .get(&command)
            .cloned()
            .unwrap_or_else(|| ScriptOutput::with_status(0)))
    }
}

/// 固定打印机列表
#[derive(Debug, Default)]
pub struct MockPrintSubsystem {
    printers: Vec<PrinterRecord>,
    unavailable: bool,
}

impl MockPrintSubsystem {
    pub fn new(printers: Vec<PrinterRecord>) -> Self {
        Self {
            printers,
            unavailable: false,
        }
    }

    /// Simulates CUPS being unreachable.
    pub fn unavailable() -> Self {
        Self {
            printers: Vec::new(),
            unavailable: true,
        }
    }

    pub fn demo() -> Self {
        Self::new(vec![
            PrinterRecord {
                name: "HP_LaserJet".to_string(),
                device_uri: "usb://HP/LaserJet%20P1102?serial=000000".to_string(),
                state: 3,
            },
            PrinterRecord {
                name: "Brother_Label".to_string(),
                device_uri: "usb://Brother/QL-700?serial=000001".to_string(),
                state: 5,
            },
            PrinterRecord {
                name: "Office".to_string(),
                device_uri: "ipp://192.168.1.20/ipp/print".to_string(),
                state: 4,
            },
        ])
    }
}

#[async_trait]
impl PrintSubsystem for MockPrintSubsystem {
    async fn printers(&self) -> Result<Vec<PrinterRecord>> {
        if self.unavailable {
            return Err(Error::CommandFailed("Simulated CUPS connection failure".into()));
        }
        Ok(self.printers.clone())
    }
}

/// 固定系统指标
#[derive(Debug, Clone)]
pub struct MockProbe {
    pub cpu: f32,
    pub memory: MemorySample,
    /// `None` simulates a missing temperature utility.
    pub temperature: Option<String>,
    pub host: HostIdentity,
}

impl Default for MockProbe {
    fn default() -> Self {
        Self {
            cpu: 12.34,
            memory: MemorySample {
                total_bytes: 4 * 1024 * 1024 * 1024,
                used_bytes: 512 * 1024 * 1024,
                percent: 12.5,
            },
            temperature: Some("temp=48.3'C\n".to_string()),
            host: HostIdentity {
                hostname: "printhub".to_string(),
                ip_address: "192.168.1.42".to_string(),
            },
        }
    }
}

#[async_trait]
impl SystemProbe for MockProbe {
    async fn cpu_percent(&self) -> f32 {
        self.cpu
    }

    async fn memory(&self) -> MemorySample {
        self.memory
    }

    async fn temperature(&self) -> Result<String> {
        self.temperature
            .clone()
            .ok_or_else(|| Error::CommandFailed("Simulated missing vcgencmd".into()))
    }

    fn host_identity(&self) -> HostIdentity {
        self.host.clone()
    }
}
