use once_cell::sync::Lazy;
use regex::Regex;

static ESSID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"ESSID:"([^"]*)""#).unwrap());
static INET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"inet (\d+\.\d+\.\d+\.\d+)").unwrap());
static SIGNAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Signal level=(-\d+) dBm").unwrap());
static ENCRYPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Encryption key:(\w+)").unwrap());

/// `iwconfig` 在未关联时输出的 ESSID
pub(super) const DISCONNECTED_ESSID: &str = "off/any";

/// One cell of an `iwlist scan` before the profile lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ScanCell {
    pub ssid: String,
    pub signal_dbm: i32,
    pub encrypted: bool,
}

/// 将 dBm 转换为百分比（近似）：-50 dBm 及以上为 100%，-100 dBm 及以下为 0%
pub fn signal_percent(dbm: i32) -> u8 {
    dbm.saturating_add(100).saturating_mul(2).clamp(0, 100) as u8
}

/// 提取第一个 `ESSID:"..."` 的值
pub(super) fn parse_essid(output: &str) -> Option<String> {
    ESSID_RE
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// 提取第一个 `inet a.b.c.d`
pub(super) fn parse_ipv4(output: &str) -> Option<String> {
    INET_RE.captures(output).map(|caps| caps[1].to_string())
}

/// 解析 `iwlist scan` 的输出
/// 以 "Cell " 分块，第一块是表头；缺少 SSID 或信号强度的块被跳过。
/// 没有 `Encryption key` 字段时按加密网络处理。
pub(super) fn parse_scan_cells(output: &str) -> Vec<ScanCell> {
    output
        .split("Cell ")
        .skip(1)
        .filter_map(|cell| {
            let ssid = parse_essid(cell)?;
            let signal_dbm = SIGNAL_RE.captures(cell)?[1].parse::<i32>().ok()?;
            let encrypted = ENCRYPTION_RE
                .captures(cell)
                .map(|caps| &caps[1] == "on")
                .unwrap_or(true);
            Some(ScanCell {
                ssid,
                signal_dbm,
                encrypted,
            })
        })
        .collect()
}
