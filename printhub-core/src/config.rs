use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// 内嵌的默认配置
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../configs/default.toml");

/// 顶层应用配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub script: ScriptConfig,
    pub wifi: WifiConfig,
    pub metrics: MetricsConfig,
    pub printers: PrintersConfig,
    pub ui: UiConfig,
}

// ============= 各个配置段 =============

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

// 不在日志里输出密码
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub admin: Credentials,
    pub client: Credentials,
    pub session_ttl_secs: u64,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin: Credentials::new("admin", "default_password"),
            client: Credentials::new("client", "client_password"),
            session_ttl_secs: 8 * 60 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub path: PathBuf,
    pub use_sudo: bool,
    pub test_document: PathBuf,
    /// Unset means an invocation may run forever.
    pub timeout_secs: Option<u64>,
}

impl ScriptConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/opt/TBERRYPRINT/fonctions.sh"),
            use_sudo: true,
            test_document: PathBuf::from(
                "/opt/TBERRYPRINT/FlaskInstallation/testImpressionInterface.pdf",
            ),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub profile_dir: PathBuf,
    pub profile_extension: String,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("/etc/NetworkManager/system-connections"),
            profile_extension: "nmconnection".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub cpu_sample_ms: u64,
    /// Program followed by its arguments.
    pub temperature_command: Vec<String>,
}

impl MetricsConfig {
    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_ms)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: 1000,
            temperature_command: vec!["vcgencmd".to_string(), "measure_temp".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrintersConfig {
    pub lpstat_path: PathBuf,
}

impl Default for PrintersConfig {
    fn default() -> Self {
        Self {
            lpstat_path: PathBuf::from("lpstat"),
        }
    }
}

/// 前端资源：未设置 `dir` 时使用嵌入的资源
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub dir: Option<PathBuf>,
}

// ============= 配置加载函数 =============

/// 从 TOML 字符串加载应用配置
pub fn load_config_from_toml_str(s: &str) -> crate::Result<AppConfig> {
    Ok(toml::from_str(s)?)
}

impl AppConfig {
    /// The configuration compiled into the binary.
    pub fn embedded() -> crate::Result<Self> {
        load_config_from_toml_str(DEFAULT_CONFIG_TOML)
    }

    /// 用环境变量覆盖登录凭据
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            ("ADMIN_USERNAME", &mut self.auth.admin.username),
            ("ADMIN_PASSWORD", &mut self.auth.admin.password),
            ("CLIENT_USERNAME", &mut self.auth.client.username),
            ("CLIENT_PASSWORD", &mut self.auth.client.password),
        ];
        for (key, slot) in targets {
            if let Some(value) = lookup(key) {
                tracing::debug!(key, "Credential overridden from environment");
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn embedded_config_matches_defaults() {
        let config = AppConfig::embedded().unwrap();
        assert_eq!(config.server.bind_addr, SocketAddr::from(([0, 0, 0, 0], 5000)));
        assert_eq!(config.auth.admin, Credentials::new("admin", "default_password"));
        assert_eq!(config.auth.client, Credentials::new("client", "client_password"));
        assert_eq!(config.wifi.profile_extension, "nmconnection");
        assert!(config.script.use_sudo);
        assert_eq!(config.script.timeout(), None);
        assert_eq!(config.metrics.cpu_sample_window(), Duration::from_secs(1));
        assert!(config.ui.dir.is_none());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config = load_config_from_toml_str(
            r#"
            [script]
            path = "/usr/local/bin/hub.sh"
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.script.path, PathBuf::from("/usr/local/bin/hub.sh"));
        assert_eq!(config.script.timeout(), Some(Duration::from_secs(30)));
        assert!(config.script.use_sudo);
        assert_eq!(config.auth.admin.username, "admin");
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = load_config_from_toml_str("[server\nbind_addr = 3").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn environment_overrides_credentials() {
        let env = HashMap::from([
            ("ADMIN_PASSWORD", "s3cret"),
            ("CLIENT_USERNAME", "front-desk"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides_with(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.auth.admin, Credentials::new("admin", "s3cret"));
        assert_eq!(config.auth.client, Credentials::new("front-desk", "client_password"));
    }

    #[test]
    fn debug_output_hides_passwords() {
        let rendered = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
