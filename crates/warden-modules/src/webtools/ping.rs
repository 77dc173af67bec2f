//! Running `ping` and reading its output.

use tokio::process::Command;
use tracing::debug;

use crate::error::{ModuleError, ModuleResult};

/// A round-trip time read from `ping` output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PingTime {
    pub millis: f64,
    /// The output only gave an upper bound (`time<1ms`).
    pub under: bool,
}

impl std::fmt::Display for PingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.under {
            write!(f, "<{}ms", self.millis)
        } else {
            write!(f, "{}ms", self.millis)
        }
    }
}

/// Finds the first `time=` / `time<` field in `output`.
///
/// Accepts both `time=3.21 ms` and `time=12ms` / `time<1ms` layouts.
pub fn parse_ping_time(output: &str) -> Option<PingTime> {
    output.split_whitespace().find_map(|token| {
        let (value, under) = if let Some(v) = token.strip_prefix("time=") {
            (v, false)
        } else if let Some(v) = token.strip_prefix("time<") {
            (v, true)
        } else {
            return None;
        };
        let value = value.strip_suffix("ms").unwrap_or(value);
        value
            .parse::<f64>()
            .ok()
            .map(|millis| PingTime { millis, under })
    })
}

/// Formats a speed in bits per second with a binary unit, rounded to two
/// decimals.
pub fn speed_convert(size: f64) -> String {
    const POWER: f64 = 1024.0;
    const UNITS: [&str; 5] = ["", "Kb/s", "Mb/s", "Gb/s", "Tb/s"];

    let mut size = size;
    let mut unit = 0;
    while size > POWER && unit < UNITS.len() - 1 {
        size /= POWER;
        unit += 1;
    }
    let rounded = (size * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

/// Rejects hosts `ping` would read as options, or that are not one word.
fn validate_host(host: &str) -> ModuleResult<()> {
    if host.is_empty() || host.starts_with('-') || host.chars().any(char::is_whitespace) {
        return Err(ModuleError::InvalidHost(host.to_string()));
    }
    Ok(())
}

/// Sends one echo request to `host` with the system `ping`.
pub async fn ping_host(host: &str) -> ModuleResult<PingTime> {
    validate_host(host)?;

    let count_flag = if cfg!(windows) { "-n" } else { "-c" };
    let output = Command::new("ping")
        .args([count_flag, "1", host])
        .kill_on_drop(true)
        .output()
        .await?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        debug!(host, status = %output.status, "ping exited unsuccessfully");
        return Err(ModuleError::Ping(format!("{host} did not answer")));
    }
    parse_ping_time(&stdout)
        .ok_or_else(|| ModuleError::Ping("no round-trip time in ping output".to_string()))
}
