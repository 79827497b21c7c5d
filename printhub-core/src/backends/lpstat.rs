use crate::config::PrintersConfig;
use crate::structs::PrinterRecord;
use crate::traits::PrintSubsystem;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::process::Command;

// IPP printer-state 取值
const STATE_IDLE: i32 = 3;
const STATE_PROCESSING: i32 = 4;
const STATE_STOPPED: i32 = 5;

/// 通过调用 CUPS 的 `lpstat` 命令行工具读取打印机列表
#[derive(Debug, Clone)]
pub struct LpstatPrintSubsystem {
    program: PathBuf,
}

impl LpstatPrintSubsystem {
    pub fn new(config: &PrintersConfig) -> Self {
        Self {
            program: config.lpstat_path.clone(),
        }
    }

    async fn lpstat(&self, flag: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .arg(flag)
            // 固定为英文输出，方便解析
            .env("LC_ALL", "C")
            .output()
            .await?;
        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CommandFailed(format!("lpstat {} failed: {}", flag, err.trim())));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// 解析 `lpstat -v` 的输出
    /// 格式: `device for <name>: <uri>`
    pub fn parse_devices(output: &str) -> Vec<(String, String)> {
        output
            .lines()
            .filter_map(|line| line.strip_prefix("device for "))
            .filter_map(|rest| rest.split_once(": "))
            .map(|(name, uri)| (name.to_string(), uri.trim().to_string()))
            .collect()
    }

    /// 解析 `lpstat -p` 的输出
    /// 格式: `printer <name> is idle.  enabled since ...` / `printer <name> now printing <job>.` /
    /// `printer <name> disabled since ...`；以空白开头的续行被忽略。
    pub fn parse_states(output: &str) -> HashMap<String, i32> {
        let mut states = HashMap::new();
        for line in output.lines() {
            let Some(rest) = line.strip_prefix("printer ") else {
                continue;
            };
            let Some((name, description)) = rest.split_once(' ') else {
                continue;
            };
            let state = if description.starts_with("is idle") {
                STATE_IDLE
            } else if description.starts_with("now printing") {
                STATE_PROCESSING
            } else if description.starts_with("disabled") {
                STATE_STOPPED
            } else {
                0
            };
            states.insert(name.to_string(), state);
        }
        states
    }
}

#[async_trait]
impl PrintSubsystem for LpstatPrintSubsystem {
    async fn printers(&self) -> Result<Vec<PrinterRecord>> {
        let devices = Self::parse_devices(&self.lpstat("-v").await?);
        let states = Self::parse_states(&self.lpstat("-p").await?);

        Ok(devices
            .into_iter()
            .map(|(name, device_uri)| {
                let state = states.get(&name).copied().unwrap_or(0);
                PrinterRecord {
                    name,
                    device_uri,
                    state,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_uris() {
        let output = "device for HP_LaserJet: usb://HP/LaserJet%20P1102?serial=000000\n\
                      device for Office: ipp://192.168.1.20/ipp/print\n\
                      system default destination: HP_LaserJet\n";
        let devices = LpstatPrintSubsystem::parse_devices(output);
        assert_eq!(
            devices,
            vec![
                ("HP_LaserJet".to_string(), "usb://HP/LaserJet%20P1102?serial=000000".to_string()),
                ("Office".to_string(), "ipp://192.168.1.20/ipp/print".to_string()),
            ]
        );
    }

    #[test]
    fn parses_printer_states() {
        let output = "printer HP_LaserJet is idle.  enabled since Tue 01 Oct 2024 10:00:00\n\
                      printer Office now printing Office-42.  enabled since Tue 01 Oct 2024\n\
                      \tWaiting for job to complete.\n\
                      printer Label disabled since Tue 01 Oct 2024 -\n\
                      \tPaused\n\
                      printer Odd frobnicating\n";
        let states = LpstatPrintSubsystem::parse_states(output);
        assert_eq!(states["HP_LaserJet"], 3);
        assert_eq!(states["Office"], 4);
        assert_eq!(states["Label"], 5);
        assert_eq!(states["Odd"], 0);
        assert_eq!(states.len(), 4);
    }

    #[tokio::test]
    async fn missing_lpstat_is_an_error() {
        let subsystem = LpstatPrintSubsystem::new(&PrintersConfig {
            lpstat_path: PathBuf::from("/nonexistent/lpstat"),
        });
        assert!(subsystem.printers().await.is_err());
    }
}
