//! `/status`: host and build information.

use std::sync::Arc;

use sysinfo::System;
use tracing::debug;

use warden_core::{ParseMode, escape_html};
use warden_framework::prelude::*;
use warden_framework::DEFAULT_GROUP;

/// A point-in-time view of the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    pub os: Option<String>,
    pub kernel: Option<String>,
    pub uptime_secs: u64,
    pub cpus: usize,
    /// Bytes.
    pub total_memory: u64,
    /// Bytes.
    pub used_memory: u64,
}

impl SystemSnapshot {
    /// Reads the host state. Blocks while sysinfo refreshes.
    pub fn capture() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();

        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => Some(format!("{name} {version}")),
            (name, _) => name,
        };

        Self {
            os,
            kernel: System::kernel_version(),
            uptime_secs: System::uptime(),
            cpus: sys.cpus().len(),
            total_memory: sys.total_memory(),
            used_memory: sys.used_memory(),
        }
    }

    /// Renders the `/status` reply.
    pub fn render(&self) -> String {
        let mut reply = String::from("<b>System Status:</b> <code>operational</code>\n\n");
        reply.push_str(&format!(
            "<b>Warden version:</b> <code>{}</code>\n",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(os) = &self.os {
            reply.push_str(&format!("<b>OS:</b> <code>{}</code>\n", escape_html(os)));
        }
        if let Some(kernel) = &self.kernel {
            reply.push_str(&format!("<b>Kernel:</b> <code>{}</code>\n", escape_html(kernel)));
        }
        reply.push_str(&format!(
            "<b>Uptime:</b> <code>{}</code>\n",
            format_uptime(self.uptime_secs)
        ));
        reply.push_str(&format!("<b>CPUs:</b> <code>{}</code>\n", self.cpus));
        reply.push_str(&format!(
            "<b>Memory:</b> <code>{} / {}</code>",
            format_bytes(self.used_memory),
            format_bytes(self.total_memory)
        ));
        reply
    }
}

fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = secs % 86_400 / 3_600;
    let minutes = secs % 3_600 / 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// The system tools module.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysTools;

impl SysTools {
    pub fn new() -> Self {
        Self
    }
}

impl Module for SysTools {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new("SysTools")
    }

    fn register_handlers(&self, table: &mut HandlerTable) {
        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["status"]), status)
                .named("systools.status")
                .detached(true),
        );
    }
}

async fn status(ctx: Arc<DispatchContext>) -> ActionResult {
    let snapshot = tokio::task::spawn_blocking(SystemSnapshot::capture)
        .await
        .map_err(ActionError::fault)?;
    debug!(cpus = snapshot.cpus, uptime = snapshot.uptime_secs, "Captured system snapshot");
    ctx.reply(&snapshot.render(), ParseMode::Html, None).await?;
    Ok(Outcome::Continue)
}
