use printhub_core::{
    auth::MemorySessionStore,
    config::AppConfig,
    factory,
    web_server::{self, AppState, Backends},
};
use std::sync::Arc;

// --- 选择后端实现 ---
#[cfg(feature = "backend_mock")]
fn create_backends(_config: &AppConfig) -> Backends {
    use printhub_core::backends::mock::{MockCommandRunner, MockPrintSubsystem, MockProbe};
    tracing::info!("🤖 Backend: Mock selected (no script, CUPS or sysinfo access)");
    Backends {
        runner: Arc::new(MockCommandRunner::demo()),
        print_subsystem: Arc::new(MockPrintSubsystem::demo()),
        probe: Arc::new(MockProbe::default()),
    }
}

#[cfg(not(feature = "backend_mock"))]
fn create_backends(config: &AppConfig) -> Backends {
    use printhub_core::backends::{LpstatPrintSubsystem, ScriptRunner, SysinfoProbe};
    tracing::info!(script = %config.script.path.display(), "🚀 Backend: privileged script selected");
    Backends {
        runner: Arc::new(ScriptRunner::new(&config.script)),
        print_subsystem: Arc::new(LpstatPrintSubsystem::new(&config.printers)),
        probe: Arc::new(SysinfoProbe::new(&config.metrics)),
    }
}

/// 组装各个适配器并启动 Web 服务器，直到服务器退出
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::debug!(?config, "Effective configuration");

    let backends = create_backends(&config);
    let frontend = factory::create_frontend(&config.ui);
    let sessions = Arc::new(MemorySessionStore::new(config.auth.session_ttl()));
    let state = Arc::new(AppState::new(&config, backends, sessions, frontend));

    tracing::info!("📡 Runner: Starting web server...");
    web_server::run_server(state, config.server.bind_addr).await?;
    Ok(())
}
