use crate::config::ScriptConfig;
use crate::structs::{Printer, PrinterView, ScriptOutput, StatusIcon};
use crate::traits::{CommandRunner, PrintSubsystem, ScriptCommand};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;

const UNKNOWN_STATUS_TEXT: &str = "Status: Unknown";
const UNKNOWN_STATUS_ICON: StatusIcon = StatusIcon {
    class: "fas fa-question-circle",
    color: "#95a5a6",
};

/// 打印机状态码对应的描述
pub fn status_text(code: i32) -> &'static str {
    match code {
        1 => "The printer has pending jobs but is not printing yet.",
        2 => "Jobs are paused and will not print until they are resumed manually.",
        3 => "The printer is ready.",
        4 => "The printer is printing.",
        5 => "The printer is stopped or in error.",
        _ => UNKNOWN_STATUS_TEXT,
    }
}

/// 打印机状态码对应的图标与颜色
pub fn status_icon(code: i32) -> StatusIcon {
    let (class, color) = match code {
        1 => ("fas fa-clock", "#f39c12"),
        2 => ("fas fa-pause-circle", "#f39c12"),
        3 => ("fas fa-check-circle", "#2ecc71"),
        4 => ("fas fa-print", "#3498db"),
        5 => ("fas fa-exclamation-circle", "#e74c3c"),
        _ => return UNKNOWN_STATUS_ICON,
    };
    StatusIcon { class, color }
}

impl From<&Printer> for PrinterView {
    fn from(printer: &Printer) -> Self {
        Self {
            name: printer.name.clone(),
            status: printer.state_code,
            status_text: status_text(printer.state_code),
            status_icon: status_icon(printer.state_code),
        }
    }
}

/// Printer enumeration through the print subsystem and control through the privileged script.
#[derive(Clone)]
pub struct PrinterAdapter {
    subsystem: Arc<dyn PrintSubsystem>,
    runner: Arc<dyn CommandRunner>,
    test_document: PathBuf,
}

impl PrinterAdapter {
    pub fn new(
        subsystem: Arc<dyn PrintSubsystem>,
        runner: Arc<dyn CommandRunner>,
        config: &ScriptConfig,
    ) -> Self {
        Self {
            subsystem,
            runner,
            test_document: config.test_document.clone(),
        }
    }

    /// USB 打印机列表；打印子系统不可用时记录日志并返回空列表
    pub async fn list_usb_printers(&self) -> Vec<Printer> {
        match self.subsystem.printers().await {
            Ok(records) => records
                .into_iter()
                .filter(|record| record.device_uri.to_lowercase().starts_with("usb:"))
                .map(|record| Printer {
                    name: record.name,
                    state_code: record.state,
                })
                .collect(),
            Err(e) => {
                tracing::error!("CUPS error: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn remove_printer(&self, name: &str) -> Result<()> {
        tracing::info!(printer = %name, "Removing printer");
        let output = self.runner.run(ScriptCommand::PrinterRemove, &[name]).await?;
        check_status(ScriptCommand::PrinterRemove, output)
    }

    pub async fn test_print(&self, name: &str) -> Result<()> {
        tracing::info!(printer = %name, "Sending test page");
        let document = self.test_document.to_string_lossy();
        let output = self
            .runner
            .run(ScriptCommand::PrintTest, &[&*document, name])
            .await?;
        check_status(ScriptCommand::PrintTest, output)
    }
}

fn check_status(command: ScriptCommand, output: ScriptOutput) -> Result<()> {
    if output.success() {
        return Ok(());
    }
    let status = output
        .status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "signal".to_string());
    Err(Error::CommandFailed(format!(
        "{} exited with status {}: {}",
        command,
        status,
        output.stderr.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::{MockCommandRunner, MockPrintSubsystem};
    use crate::structs::PrinterRecord;

    fn adapter(subsystem: MockPrintSubsystem, runner: Arc<MockCommandRunner>) -> PrinterAdapter {
        PrinterAdapter::new(Arc::new(subsystem), runner, &ScriptConfig::default())
    }

    #[test]
    fn status_tables_cover_every_code() {
        for code in 1..=5 {
            assert_ne!(status_text(code), UNKNOWN_STATUS_TEXT);
            assert_ne!(status_icon(code), UNKNOWN_STATUS_ICON);
        }
        assert_eq!(status_text(3), "The printer is ready.");
        assert_eq!(status_icon(4).class, "fas fa-print");
        for code in [0, 6, -1, i32::MAX] {
            assert_eq!(status_text(code), UNKNOWN_STATUS_TEXT);
            assert_eq!(status_icon(code), UNKNOWN_STATUS_ICON);
        }
    }

    #[tokio::test]
    async fn only_usb_printers_are_listed() {
        let subsystem = MockPrintSubsystem::new(vec![
            PrinterRecord {
                name: "Laser".into(),
                device_uri: "USB://HP/LaserJet".into(),
                state: 3,
            },
            PrinterRecord {
                name: "Network".into(),
                device_uri: "ipp://10.0.0.5/ipp".into(),
                state: 3,
            },
            PrinterRecord {
                name: "Label".into(),
                device_uri: "usb://Brother/QL".into(),
                state: 9,
            },
        ]);
        let printers = adapter(subsystem, Arc::new(MockCommandRunner::new()))
            .list_usb_printers()
            .await;
        assert_eq!(
            printers,
            vec![
                Printer { name: "Laser".into(), state_code: 3 },
                Printer { name: "Label".into(), state_code: 9 },
            ]
        );
    }

    #[tokio::test]
    async fn subsystem_failure_yields_empty_list() {
        let printers = adapter(MockPrintSubsystem::unavailable(), Arc::new(MockCommandRunner::new()))
            .list_usb_printers()
            .await;
        assert!(printers.is_empty());
    }

    #[tokio::test]
    async fn test_print_passes_document_then_printer() {
        let runner = Arc::new(MockCommandRunner::new());
        adapter(MockPrintSubsystem::default(), runner.clone())
            .test_print("Laser")
            .await
            .unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, ScriptCommand::PrintTest);
        assert_eq!(
            calls[0].args,
            vec![
                "/opt/TBERRYPRINT/FlaskInstallation/testImpressionInterface.pdf".to_string(),
                "Laser".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_removal_carries_stderr() {
        let runner = Arc::new(MockCommandRunner::new().with_response(
            ScriptCommand::PrinterRemove,
            ScriptOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "lpadmin: The printer or class does not exist.\n".into(),
            },
        ));
        let err = adapter(MockPrintSubsystem::default(), runner)
            .remove_printer("Ghost")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("printer_remove exited with status 1"));
        assert!(message.contains("The printer or class does not exist."));
    }
}
