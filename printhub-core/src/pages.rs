//! HTML 页面渲染
//!
//! 模板来自 `UiAssetProvider` 的 `templates/` 目录，占位符写作 `{{key}}`。
//! 普通值一律转义；只有本模块自己拼出来的片段才以原样插入。

use crate::metrics::format_percent;
use crate::structs::{HostIdentity, PrinterView, Role, WifiStatus};
use crate::traits::UiAssetProvider;
use crate::Result;
use std::collections::HashMap;

pub const INDEX_TEMPLATE: &str = "templates/index.html";
pub const LOGIN_TEMPLATE: &str = "templates/login.html";
pub const WIFI_TEMPLATE: &str = "templates/wifi_setup.html";

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// A template with its placeholder values.
pub struct Template {
    source: String,
    values: HashMap<&'static str, String>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            values: HashMap::new(),
        }
    }

    /// Sets a placeholder to an escaped value.
    pub fn set(mut self, key: &'static str, value: &str) -> Self {
        self.values.insert(key, escape_html(value));
        self
    }

    /// Sets a placeholder to markup built by this module.
    fn set_markup(mut self, key: &'static str, markup: String) -> Self {
        self.values.insert(key, markup);
        self
    }

    /// Single pass over the source, so inserted values are never expanded again.
    /// Unknown placeholders render as nothing.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                out.push_str(&rest[start..]);
                return out;
            };
            if let Some(value) = self.values.get(after[..end].trim()) {
                out.push_str(value);
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        out
    }
}

pub async fn load_template(frontend: &dyn UiAssetProvider, path: &str) -> Result<Template> {
    let (data, _) = frontend.get_asset(path).await?;
    Ok(Template::new(String::from_utf8_lossy(&data).into_owned()))
}

/// 仪表盘页面所需的全部数据
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub role: Role,
    pub host: HostIdentity,
    pub cpu_percent: f32,
    pub temperature: String,
    pub ram_used: String,
    pub ram_total: String,
    pub ram_percent: f32,
    pub printers: Vec<PrinterView>,
}

pub fn render_dashboard(template: Template, view: &DashboardView) -> String {
    template
        .set("hostname", &view.host.hostname)
        .set("ip_address", &view.host.ip_address)
        .set("role", view.role.as_str())
        .set("cpu_percent", &format_percent(view.cpu_percent))
        .set("temperature", &view.temperature)
        .set("ram_used", &view.ram_used)
        .set("ram_total", &view.ram_total)
        .set("ram_percent", &format_percent(view.ram_percent))
        .set_markup("printers", printer_rows(&view.printers))
        .set_markup("admin_controls", admin_controls(view.role))
        .render()
}

pub fn render_login(template: Template, error: Option<&str>) -> String {
    let markup = error
        .map(|message| format!(r#"<div class="error-message">{}</div>"#, escape_html(message)))
        .unwrap_or_default();
    template.set_markup("error", markup).render()
}

pub fn render_wifi_setup(template: Template, status: &WifiStatus, host: &HostIdentity) -> String {
    template
        .set("hostname", &host.hostname)
        .set("ip_address", &host.ip_address)
        .set_markup("wifi_status", wifi_status_block(status))
        .render()
}

fn printer_rows(printers: &[PrinterView]) -> String {
    if printers.is_empty() {
        return r#"<p class="empty">No USB printer detected</p>"#.to_string();
    }
    printers
        .iter()
        .map(|printer| {
            let name = escape_html(&printer.name);
            format!(
                r#"<div class="printer" data-printer="{name}">
  <i class="{class}" style="color: {color};"></i>
  <span class="printer-name">{name}</span>
  <span class="printer-status">{text}</span>
  <button class="btn" data-action="test_print">Test page</button>
  <button class="btn btn-danger" data-action="delete_printer">Remove</button>
</div>"#,
                name = name,
                class = printer.status_icon.class,
                color = printer.status_icon.color,
                text = escape_html(printer.status_text),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// 只有管理员能看到重启、更新和改主机名
fn admin_controls(role: Role) -> String {
    if role != Role::Admin {
        return String::new();
    }
    r#"<section class="card admin">
  <h2>Administration</h2>
  <form method="post" action="/change_hostname">
    <input type="text" name="hostname" placeholder="New hostname" pattern="[A-Za-z0-9]+" required>
    <button class="btn" type="submit">Change hostname</button>
  </form>
  <form method="post" action="/update">
    <button class="btn" type="submit">Update system</button>
  </form>
  <form method="post" action="/reboot">
    <button class="btn btn-danger" type="submit">Reboot</button>
  </form>
</section>"#
        .to_string()
}

fn wifi_status_block(status: &WifiStatus) -> String {
    match (&status.ssid, status.connected) {
        (Some(ssid), true) => format!(
            r#"<div class="current-connection">
  <h3><i class="fas fa-check-circle" style="color: #2ecc71;"></i> Connected</h3>
  <div class="stat"><span class="stat-label">Network:</span> <span class="stat-value">{}</span></div>
  <div class="stat"><span class="stat-label">IP address:</span> <span class="stat-value">{}</span></div>
</div>"#,
            escape_html(ssid),
            escape_html(status.ip_address.as_deref().unwrap_or("-")),
        ),
        _ => r#"<div class="stat"><i class="fas fa-times-circle" style="color: #e74c3c;"></i> <span class="stat-value">Not connected to a Wi-Fi network</span></div>"#
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::StatusIcon;

    fn view(role: Role) -> DashboardView {
        DashboardView {
            role,
            host: HostIdentity {
                hostname: "printhub".into(),
                ip_address: "192.168.1.42".into(),
            },
            cpu_percent: 0.5,
            temperature: "48.3'C".into(),
            ram_used: "512 Mo".into(),
            ram_total: "4.00 Go".into(),
            ram_percent: 12.5,
            printers: vec![PrinterView {
                name: "<Laser>".into(),
                status: 3,
                status_text: "The printer is ready.",
                status_icon: StatusIcon {
                    class: "fas fa-check-circle",
                    color: "#2ecc71",
                },
            }],
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn placeholders_are_replaced_once() {
        let html = Template::new("<p>{{ a }}|{{b}}|{{missing}}</p>{{unclosed")
            .set("a", "{{b}}")
            .set("b", "x<y")
            .render();
        assert_eq!(html, "<p>{{b}}|x&lt;y|</p>{{unclosed");
    }

    #[test]
    fn dashboard_hides_admin_controls_from_clients() {
        let source = "{{cpu_percent}} {{ram_percent}} {{printers}} {{admin_controls}}";
        let admin = render_dashboard(Template::new(source), &view(Role::Admin));
        assert!(admin.contains("0.50%"));
        assert!(admin.contains("12.5%"));
        assert!(admin.contains("&lt;Laser&gt;"));
        assert!(admin.contains("/change_hostname"));

        let client = render_dashboard(Template::new(source), &view(Role::Client));
        assert!(!client.contains("/change_hostname"));
        assert!(!client.contains("/reboot"));
    }

    #[test]
    fn login_error_is_optional() {
        assert_eq!(render_login(Template::new("[{{error}}]"), None), "[]");
        let html = render_login(Template::new("[{{error}}]"), Some("Invalid credentials"));
        assert!(html.contains("Invalid credentials"));
    }

    #[test]
    fn wifi_page_shows_connection() {
        let host = HostIdentity {
            hostname: "printhub".into(),
            ip_address: "10.0.0.2".into(),
        };
        let connected = WifiStatus {
            connected: true,
            ssid: Some("Home".into()),
            ip_address: Some("10.0.0.2".into()),
        };
        let html = render_wifi_setup(Template::new("{{wifi_status}}"), &connected, &host);
        assert!(html.contains("Home"));
        let html = render_wifi_setup(Template::new("{{wifi_status}}"), &WifiStatus::default(), &host);
        assert!(html.contains("Not connected"));
    }
}
