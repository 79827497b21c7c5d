//! System health: CPU, memory, temperature, and the display formatting used by the dashboard.

use crate::structs::{HostIdentity, MemorySample};
use crate::traits::SystemProbe;
use std::sync::Arc;

/// Shown when the temperature utility cannot be read.
pub const TEMPERATURE_UNAVAILABLE: &str = "Unavailable";

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// 将字节数格式化为 "X Mo"（不足 1 GiB）或 "X.XX Go"
pub fn format_bytes(bytes: u64) -> String {
    let gib = bytes as f64 / GIB;
    if gib < 1.0 {
        let mib = (bytes as f64 / MIB).round();
        return format!("{} Mo", mib as u64);
    }
    format!("{:.2} Go", gib)
}

/// 百分比：小于 1 时保留两位小数，否则一位
pub fn format_percent(value: f32) -> String {
    if value < 1.0 {
        format!("{:.2}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// `vcgencmd measure_temp` 输出形如 `temp=48.3'C`
fn parse_temperature(raw: &str) -> Option<String> {
    let value = raw.lines().next()?.replace("temp=", "");
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Clone)]
pub struct Metrics {
    probe: Arc<dyn SystemProbe>,
}

impl Metrics {
    pub fn new(probe: Arc<dyn SystemProbe>) -> Self {
        Self { probe }
    }

    pub async fn sample_cpu_percent(&self) -> f32 {
        self.probe.cpu_percent().await
    }

    pub async fn sample_memory(&self) -> MemorySample {
        self.probe.memory().await
    }

    /// Never fails: any problem with the utility yields [`TEMPERATURE_UNAVAILABLE`].
    pub async fn read_temperature(&self) -> String {
        match self.probe.temperature().await {
            Ok(raw) => parse_temperature(&raw).unwrap_or_else(|| {
                tracing::warn!(raw = %raw.trim(), "Unrecognised temperature output");
                TEMPERATURE_UNAVAILABLE.to_string()
            }),
            Err(e) => {
                tracing::warn!("Failed to read CPU temperature: {}", e);
                TEMPERATURE_UNAVAILABLE.to_string()
            }
        }
    }

    pub fn host_identity(&self) -> HostIdentity {
        self.probe.host_identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::mock::MockProbe;

    #[test]
    fn bytes_below_one_gib_use_mebibytes() {
        assert_eq!(format_bytes(500 * 1024 * 1024), "500 Mo");
        assert_eq!(format_bytes(0), "0 Mo");
        // 1.5 MiB rounds to 2
        assert_eq!(format_bytes(1024 * 1024 + 512 * 1024), "2 Mo");
        assert_eq!(format_bytes(1024 * 1024 * 1024 - 1), "1024 Mo");
    }

    #[test]
    fn bytes_from_one_gib_use_gibibytes() {
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 Go");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.00 Go");
        assert_eq!(format_bytes(3_865_470_566), "3.60 Go");
    }

    #[test]
    fn percent_precision_depends_on_magnitude() {
        assert_eq!(format_percent(0.5), "0.50%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(45.67), "45.7%");
        assert_eq!(format_percent(1.0), "1.0%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn temperature_prefix_is_stripped() {
        assert_eq!(parse_temperature("temp=48.3'C\n").as_deref(), Some("48.3'C"));
        assert_eq!(parse_temperature("  \n"), None);
        assert_eq!(parse_temperature(""), None);
    }

    #[tokio::test]
    async fn temperature_falls_back_to_sentinel() {
        let metrics = Metrics::new(Arc::new(MockProbe {
            temperature: None,
            ..Default::default()
        }));
        assert_eq!(metrics.read_temperature().await, TEMPERATURE_UNAVAILABLE);

        let metrics = Metrics::new(Arc::new(MockProbe::default()));
        assert_eq!(metrics.read_temperature().await, "48.3'C");
    }
}
