use crate::config::ScriptConfig;
use crate::structs::ScriptOutput;
use crate::traits::{CommandRunner, ScriptCommand};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// 通过 `[sudo] <script> <subcommand> [args...]` 调用特权脚本
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    program: PathBuf,
    use_sudo: bool,
    timeout: Option<Duration>,
}

impl ScriptRunner {
    pub fn new(config: &ScriptConfig) -> Self {
        Self {
            program: config.path.clone(),
            use_sudo: config.use_sudo,
            timeout: config.timeout(),
        }
    }

    fn build_command(&self, command: ScriptCommand, args: &[&str]) -> Command {
        let mut cmd = if self.use_sudo {
            let mut sudo = Command::new("sudo");
            sudo.arg(&self.program);
            sudo
        } else {
            Command::new(&self.program)
        };
        cmd.arg(command.as_str())
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ScriptRunner {
    async fn run(&self, command: ScriptCommand, args: &[&str]) -> Result<ScriptOutput> {
        // 参数里可能有 Wi-Fi 密码，只记录参数个数
        tracing::debug!(%command, argc = args.len(), "Invoking privileged script");
        let mut cmd = self.build_command(command, args);

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cmd.output())
                .await
                .map_err(|_| Error::Timeout(format!("{} exceeded {:?}", command, limit)))??,
            None => cmd.output().await?,
        };

        let output = ScriptOutput::from(output);
        if !output.success() {
            tracing::warn!(
                %command,
                status = ?output.status,
                stderr = %output.stderr.trim(),
                "Privileged script returned a failure status"
            );
        }
        Ok(output)
    }
}
