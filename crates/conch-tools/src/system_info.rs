use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::executor::{Tool, ToolError};
use crate::registry::ToolDef;

/// Snapshot returned by `get_system_info`.
#[derive(Debug, Serialize)]
struct SystemInfo {
    os_release: BTreeMap<String, String>,
    platform: &'static str,
    cpu_arch: &'static str,
    /// Bytes.
    total_memory: Option<u64>,
    /// Bytes.
    free_memory: Option<u64>,
    uptime_in_seconds: Option<f64>,
}

/// Reports OS release fields, platform, architecture, memory and uptime.
///
/// Reads `/etc/os-release`, `/proc/meminfo` and `/proc/uptime` under a root
/// directory (`/` outside of tests). Where `/proc` is absent (macOS, Windows)
/// memory and uptime come from the host through `sysinfo` instead. Values that
/// neither source provides are `null`; a missing `os-release` is an empty map.
#[derive(Debug, Clone)]
pub struct SystemInfoTool {
    root: PathBuf,
    host_fallback: bool,
}

impl Default for SystemInfoTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemInfoTool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/"),
            host_fallback: true,
        }
    }

    /// Resolve the system files against `root` instead of `/`.
    ///
    /// Only the files under `root` are consulted unless
    /// [`SystemInfoTool::with_host_fallback`] is also applied.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            host_fallback: false,
        }
    }

    /// Fill memory and uptime from the host when the `/proc` files are missing.
    #[must_use]
    pub fn with_host_fallback(mut self) -> Self {
        self.host_fallback = true;
        self
    }

    async fn collect(&self) -> SystemInfo {
        let os_release = match read_to_string(&self.root.join("etc/os-release")).await {
            Ok(content) => parse_os_release(&content),
            Err(e) => {
                tracing::warn!("could not read /etc/os-release: {e}");
                BTreeMap::new()
            }
        };

        let (mut total_memory, mut free_memory) = read_to_string(&self.root.join("proc/meminfo"))
            .await
            .map(|content| parse_meminfo(&content))
            .unwrap_or_default();

        let mut uptime_in_seconds = read_to_string(&self.root.join("proc/uptime"))
            .await
            .ok()
            .and_then(|content| parse_uptime(&content));

        if self.host_fallback
            && (total_memory.is_none() || free_memory.is_none() || uptime_in_seconds.is_none())
        {
            tracing::debug!("proc files incomplete, reading memory and uptime from host");
            let host = host_snapshot();
            total_memory = total_memory.or(host.total_memory);
            free_memory = free_memory.or(host.free_memory);
            uptime_in_seconds = uptime_in_seconds.or(host.uptime_in_seconds);
        }

        SystemInfo {
            os_release,
            platform: std::env::consts::OS,
            cpu_arch: std::env::consts::ARCH,
            total_memory,
            free_memory,
            uptime_in_seconds,
        }
    }
}

impl Tool for SystemInfoTool {
    fn definition(&self) -> ToolDef {
        ToolDef {
            id: "get_system_info",
            description: "Get information about the system",
            schema: schemars::json_schema!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    async fn invoke(&self, _args: &serde_json::Value) -> Result<String, ToolError> {
        let info = self.collect().await;
        serde_json::to_string(&info).map_err(|e| ToolError::Execution(std::io::Error::other(e)))
    }
}

struct HostSnapshot {
    total_memory: Option<u64>,
    free_memory: Option<u64>,
    uptime_in_seconds: Option<f64>,
}

/// Memory and uptime through the platform APIs. Zero readings count as unknown.
fn host_snapshot() -> HostSnapshot {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    let uptime = sysinfo::System::uptime();
    #[allow(clippy::cast_precision_loss)]
    let uptime_in_seconds = (uptime > 0).then_some(uptime as f64);
    HostSnapshot {
        total_memory: Some(sys.total_memory()).filter(|&b| b > 0),
        free_memory: Some(sys.available_memory()).filter(|&b| b > 0),
        uptime_in_seconds,
    }
}

async fn read_to_string(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}

/// Parse `KEY=VALUE` lines, dropping surrounding quotes. Lines without a key or
/// value are skipped.
fn parse_os_release(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim().replace(['"', '\''], "")))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_owned(), value))
        .collect()
}

/// Returns `(MemTotal, MemAvailable)` in bytes.
fn parse_meminfo(content: &str) -> (Option<u64>, Option<u64>) {
    let field = |name: &str| {
        content.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            kib.checked_mul(1024)
        })
    };
    (field("MemTotal"), field("MemAvailable"))
}

fn parse_uptime(content: &str) -> Option<f64> {
    content.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OS_RELEASE: &str = r#"NAME="Ubuntu"
VERSION_ID="24.04"
# comment line
ID=ubuntu
PRETTY_NAME='Ubuntu 24.04 LTS'
EMPTY=
"#;

    const MEMINFO: &str = "MemTotal:       16314348 kB
MemFree:         1123456 kB
MemAvailable:    8000000 kB
Buffers:          123456 kB
";

    #[test]
    fn os_release_strips_quotes_and_skips_blanks() {
        let fields = parse_os_release(OS_RELEASE);
        assert_eq!(fields.get("NAME").map(String::as_str), Some("Ubuntu"));
        assert_eq!(fields.get("VERSION_ID").map(String::as_str), Some("24.04"));
        assert_eq!(fields.get("ID").map(String::as_str), Some("ubuntu"));
        assert_eq!(
            fields.get("PRETTY_NAME").map(String::as_str),
            Some("Ubuntu 24.04 LTS")
        );
        assert!(!fields.contains_key("EMPTY"));
        assert_eq!(fields.len(), 4);
    }

    #[test]
    fn meminfo_reports_bytes() {
        let (total, free) = parse_meminfo(MEMINFO);
        assert_eq!(total, Some(16_314_348 * 1024));
        assert_eq!(free, Some(8_000_000 * 1024));
    }

    #[test]
    fn meminfo_missing_fields() {
        assert_eq!(parse_meminfo("Buffers: 1 kB\n"), (None, None));
    }

    #[test]
    fn uptime_takes_first_field() {
        assert_eq!(parse_uptime("12345.67 54321.00\n"), Some(12345.67));
        assert_eq!(parse_uptime(""), None);
        assert_eq!(parse_uptime("abc"), None);
    }

    #[tokio::test]
    async fn invoke_reads_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("etc")).unwrap();
        std::fs::create_dir_all(dir.path().join("proc")).unwrap();
        std::fs::write(dir.path().join("etc/os-release"), OS_RELEASE).unwrap();
        std::fs::write(dir.path().join("proc/meminfo"), MEMINFO).unwrap();
        std::fs::write(dir.path().join("proc/uptime"), "42.5 80.0\n").unwrap();

        let tool = SystemInfoTool::with_root(dir.path());
        let out = tool.invoke(&serde_json::Value::Null).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["os_release"]["ID"], "ubuntu");
        assert_eq!(json["platform"], std::env::consts::OS);
        assert_eq!(json["cpu_arch"], std::env::consts::ARCH);
        assert_eq!(json["total_memory"], 16_314_348_u64 * 1024);
        assert_eq!(json["free_memory"], 8_000_000_u64 * 1024);
        assert_eq!(json["uptime_in_seconds"], 42.5);
    }

    #[tokio::test]
    async fn invoke_with_missing_files_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SystemInfoTool::with_root(dir.path());
        let out = tool.invoke(&serde_json::json!({})).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["os_release"], serde_json::json!({}));
        assert!(json["total_memory"].is_null());
        assert!(json["free_memory"].is_null());
        assert!(json["uptime_in_seconds"].is_null());
    }

    #[test]
    fn definition_has_empty_object_schema() {
        let def = SystemInfoTool::new().definition();
        assert_eq!(def.id, "get_system_info");
        let schema = serde_json::to_value(&def.schema).unwrap();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn host_fallback_fills_memory_without_proc() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SystemInfoTool::with_root(dir.path()).with_host_fallback();
        let out = tool.invoke(&serde_json::json!({})).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["os_release"], serde_json::json!({}));
        assert!(json["total_memory"].as_u64().is_some_and(|b| b > 0));
        assert!(json["free_memory"].as_u64().is_some());
    }

    #[tokio::test]
    async fn host_fallback_keeps_proc_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("proc")).unwrap();
        std::fs::write(dir.path().join("proc/meminfo"), MEMINFO).unwrap();
        std::fs::write(dir.path().join("proc/uptime"), "42.5 80.0\n").unwrap();

        let tool = SystemInfoTool::with_root(dir.path()).with_host_fallback();
        let out = tool.invoke(&serde_json::Value::Null).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(json["total_memory"], 16_314_348_u64 * 1024);
        assert_eq!(json["uptime_in_seconds"], 42.5);
    }

    #[tokio::test]
    async fn default_tool_reports_memory_on_any_platform() {
        let out = SystemInfoTool::new()
            .invoke(&serde_json::Value::Null)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(json["total_memory"].as_u64().is_some_and(|b| b > 0));
    }
}
