use crate::auth::{self, AdminSession, ApiSession, PageSession, INVALID_CREDENTIALS, SESSION_COOKIE};
use crate::config::{AppConfig, AuthConfig};
use crate::metrics::{format_bytes, format_percent, Metrics};
use crate::pages::{self, DashboardView, INDEX_TEMPLATE, LOGIN_TEMPLATE, WIFI_TEMPLATE};
use crate::printers::PrinterAdapter;
use crate::structs::{
    HostnameForm, LoginForm, PrinterView, Session, StatsResponse, WifiForm, WifiNetworksResponse,
};
use crate::system::SystemControl;
use crate::traits::{CommandRunner, PrintSubsystem, SessionStore, SystemProbe, UiAssetProvider};
use crate::wifi::{ConnectOutcome, WifiControl};
use axum::{
    body::Body,
    extract::{rejection::FormRejection, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// The external collaborators the adapters are built on.
#[derive(Clone)]
pub struct Backends {
    pub runner: Arc<dyn CommandRunner>,
    pub print_subsystem: Arc<dyn PrintSubsystem>,
    pub probe: Arc<dyn SystemProbe>,
}

// The shared state for our web server.
// Every adapter holds `Arc<dyn Trait>` collaborators, so any implementation can be injected.
pub struct AppState {
    pub auth: AuthConfig,
    pub sessions: Arc<dyn SessionStore>,
    pub metrics: Metrics,
    pub printers: PrinterAdapter,
    pub wifi: WifiControl,
    pub system: SystemControl,
    pub frontend: Arc<dyn UiAssetProvider>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        config: &AppConfig,
        backends: Backends,
        sessions: Arc<dyn SessionStore>,
        frontend: Arc<dyn UiAssetProvider>,
    ) -> Self {
        Self {
            auth: config.auth.clone(),
            sessions,
            metrics: Metrics::new(backends.probe),
            printers: PrinterAdapter::new(
                backends.print_subsystem,
                backends.runner.clone(),
                &config.script,
            ),
            wifi: WifiControl::new(backends.runner.clone(), &config.wifi),
            system: SystemControl::new(backends.runner),
            frontend,
        }
    }
}

pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/wifi_setup", get(wifi_setup_page))
        .route("/stats", get(stats))
        .route("/api/wifi_networks", get(wifi_networks))
        .route("/delete_printer/{name}", post(delete_printer))
        .route("/test_print/{name}", post(test_print))
        .route("/setup_wifi", post(setup_wifi))
        .route("/setup_wifi_connected", post(setup_wifi_connected))
        .route("/reboot", post(reboot))
        .route("/update", post(update))
        .route("/change_hostname", post(change_hostname))
        .route("/static/{*path}", get(serve_static_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves until the server fails.
pub async fn run_server(state: SharedState, addr: SocketAddr) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Web server listening on {}", addr);
    axum::serve(listener, app(state))
        .await
        .map_err(|e| crate::Error::WebServer(e.into()))
}

// --- Helpers ---

fn json_result(status: StatusCode, success: bool, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "success": success, "message": message.into() })),
    )
        .into_response()
}

async fn render_page<F>(state: &AppState, template: &str, render: F) -> Response
where
    F: FnOnce(pages::Template) -> String,
{
    match pages::load_template(state.frontend.as_ref(), template).await {
        Ok(template) => Html(render(template)).into_response(),
        Err(e) => {
            tracing::error!("Failed to load template {}: {}", template, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template unavailable").into_response()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// --- Page Handlers ---

async fn dashboard(State(state): State<SharedState>, PageSession(session): PageSession) -> Response {
    let (cpu_percent, memory, temperature, printers) = tokio::join!(
        state.metrics.sample_cpu_percent(),
        state.metrics.sample_memory(),
        state.metrics.read_temperature(),
        state.printers.list_usb_printers(),
    );
    let view = DashboardView {
        role: session.role,
        host: state.metrics.host_identity(),
        cpu_percent,
        temperature,
        ram_used: format_bytes(memory.used_bytes),
        ram_total: format_bytes(memory.total_bytes),
        ram_percent: memory.percent,
        printers: printers.iter().map(PrinterView::from).collect(),
    };
    render_page(&state, INDEX_TEMPLATE, |template| pages::render_dashboard(template, &view)).await
}

async fn login_page(State(state): State<SharedState>) -> Response {
    render_page(&state, LOGIN_TEMPLATE, |template| pages::render_login(template, None)).await
}

async fn login(State(state): State<SharedState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let username = form.username.unwrap_or_default();
    let password = form.password.unwrap_or_default();

    let Some(role) = auth::authenticate(&state.auth, &username, &password) else {
        tracing::warn!(%username, "Rejected login");
        return render_page(&state, LOGIN_TEMPLATE, |template| {
            pages::render_login(template, Some(INVALID_CREDENTIALS))
        })
        .await;
    };

    tracing::info!(%username, role = role.as_str(), "User logged in");
    let token = state.sessions.create(Session::new(role)).await;
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), Redirect::to("/")).into_response()
}

async fn logout(State(state): State<SharedState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login")).into_response()
}

async fn wifi_setup_page(State(state): State<SharedState>, PageSession(_): PageSession) -> Response {
    let status = state.wifi.current_status().await;
    let host = state.metrics.host_identity();
    render_page(&state, WIFI_TEMPLATE, |template| {
        pages::render_wifi_setup(template, &status, &host)
    })
    .await
}

/// Serves a static asset (e.g., CSS, JS) from the frontend provider.
async fn serve_static_asset(State(state): State<SharedState>, Path(path): Path<String>) -> Response {
    match state.frontend.get_asset(&format!("static/{}", path)).await {
        Ok((data, mime)) => (StatusCode::OK, [(header::CONTENT_TYPE, mime)], Body::from(data)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, format!("Asset not found: {}", path)).into_response(),
    }
}

// --- API Handlers ---

async fn stats(State(state): State<SharedState>, ApiSession(_): ApiSession) -> Response {
    let (cpu_percent, memory, temperature, printers) = tokio::join!(
        state.metrics.sample_cpu_percent(),
        state.metrics.sample_memory(),
        state.metrics.read_temperature(),
        state.printers.list_usb_printers(),
    );
    Json(StatsResponse {
        cpu_percent: format_percent(cpu_percent),
        raw_cpu_percent: cpu_percent,
        temperature,
        ram_used: format_bytes(memory.used_bytes),
        ram_percent: format_percent(memory.percent),
        raw_ram_percent: memory.percent,
        printers: printers.iter().map(PrinterView::from).collect(),
    })
    .into_response()
}

async fn wifi_networks(State(state): State<SharedState>, ApiSession(_): ApiSession) -> Response {
    let (networks, current_status) = tokio::join!(state.wifi.scan_networks(), state.wifi.current_status());
    Json(WifiNetworksResponse {
        networks,
        current_status,
    })
    .into_response()
}

async fn delete_printer(
    State(state): State<SharedState>,
    ApiSession(_): ApiSession,
    Path(name): Path<String>,
) -> Response {
    match state.printers.remove_printer(&name).await {
        Ok(()) => json_result(StatusCode::OK, true, "Printer removed successfully"),
        Err(e) => {
            tracing::error!(printer = %name, "Failed to remove printer: {}", e);
            json_result(StatusCode::INTERNAL_SERVER_ERROR, false, e.to_string())
        }
    }
}

async fn test_print(
    State(state): State<SharedState>,
    ApiSession(_): ApiSession,
    Path(name): Path<String>,
) -> Response {
    match state.printers.test_print(&name).await {
        Ok(()) => json_result(StatusCode::OK, true, "Test print started successfully"),
        Err(e) => {
            tracing::error!(printer = %name, "Test print failed: {}", e);
            json_result(StatusCode::INTERNAL_SERVER_ERROR, false, e.to_string())
        }
    }
}

fn missing_wifi_fields() -> Response {
    json_result(StatusCode::BAD_REQUEST, false, "SSID and password required")
}

fn connect_response(outcome: ConnectOutcome) -> Response {
    match outcome {
        // 已知网络直接回到配置页，与其余分支的 JSON 响应不同
        ConnectOutcome::AlreadyConfigured => Redirect::to("/wifi_setup").into_response(),
        ConnectOutcome::Connected => Json(json!({
            "success": true,
            "message": "Wi-Fi connection configured successfully",
            "requires_reboot": true,
        }))
        .into_response(),
        ConnectOutcome::WrongPassword => json_result(
            StatusCode::BAD_REQUEST,
            false,
            "Connection failed: the password appears to be incorrect",
        ),
        ConnectOutcome::Failed(stderr) => json_result(
            StatusCode::INTERNAL_SERVER_ERROR,
            false,
            format!("Error while configuring Wi-Fi: {}", stderr),
        ),
    }
}

async fn setup_wifi(
    State(state): State<SharedState>,
    ApiSession(_): ApiSession,
    form: Result<Form<WifiForm>, FormRejection>,
) -> Response {
    let Ok(Form(form)) = form else {
        return missing_wifi_fields();
    };
    let (Some(ssid), Some(password)) = (non_empty(form.ssid), non_empty(form.password)) else {
        return missing_wifi_fields();
    };
    connect_response(state.wifi.connect_new(&ssid, &password).await)
}

async fn setup_wifi_connected(
    State(state): State<SharedState>,
    ApiSession(_): ApiSession,
    form: Result<Form<WifiForm>, FormRejection>,
) -> Response {
    let Some(ssid) = form.ok().and_then(|Form(form)| non_empty(form.ssid)) else {
        return missing_wifi_fields();
    };
    connect_response(state.wifi.connect_known(&ssid).await)
}

// --- Admin Handlers ---
// 这些操作都以重启结束，在后台任务中执行，请求立即重定向。

async fn reboot(State(state): State<SharedState>, AdminSession(_): AdminSession) -> Redirect {
    tracing::info!("Reboot requested");
    let system = state.system.clone();
    tokio::spawn(async move { system.reboot().await });
    Redirect::to("/")
}

async fn update(State(state): State<SharedState>, AdminSession(_): AdminSession) -> Redirect {
    tracing::info!("System update requested");
    let system = state.system.clone();
    tokio::spawn(async move { system.update_and_reboot().await });
    Redirect::to("/")
}

async fn change_hostname(
    State(state): State<SharedState>,
    AdminSession(_): AdminSession,
    form: Result<Form<HostnameForm>, FormRejection>,
) -> Redirect {
    if let Some(hostname) = form.ok().and_then(|Form(form)| non_empty(form.hostname)) {
        let system = state.system.clone();
        tokio::spawn(async move { system.set_hostname_and_reboot(&hostname).await });
    }
    Redirect::to("/")
}
