//! Network tools for the bot's operators: `/ping`, `/cping` and `/ip`.

mod ping;

pub use ping::{PingTime, parse_ping_time, ping_host, speed_convert};

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use warden_framework::prelude::*;
use warden_framework::DEFAULT_GROUP;

use crate::access::Privileges;
use crate::error::ModuleResult;

/// Address of the backend data centre `/ping` measures.
pub const DEFAULT_DC_ADDRESS: &str = "149.154.167.220";

/// Service answering with the caller's public address as plain text.
pub const DEFAULT_IP_ENDPOINT: &str = "http://ipinfo.io/ip";

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct Settings {
    dc_address: String,
    ip_endpoint: String,
    client: reqwest::Client,
}

/// The web tools module.
///
/// `/ping` and `/cping` are for sudo users, `/ip` answers only in the
/// owner's private chat. All three run detached.
#[derive(Debug, Clone)]
pub struct WebTools {
    privileges: Privileges,
    settings: Settings,
}

impl WebTools {
    pub fn new(privileges: Privileges) -> Self {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            privileges,
            settings: Settings {
                dc_address: DEFAULT_DC_ADDRESS.to_string(),
                ip_endpoint: DEFAULT_IP_ENDPOINT.to_string(),
                client,
            },
        }
    }

    /// Overrides the address `/ping` measures (builder pattern).
    pub fn dc_address(mut self, address: impl Into<String>) -> Self {
        self.settings.dc_address = address.into();
        self
    }

    /// Overrides the service `/ip` asks (builder pattern).
    pub fn ip_endpoint(mut self, url: impl Into<String>) -> Self {
        self.settings.ip_endpoint = url.into();
        self
    }
}

impl Module for WebTools {
    fn descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor::new("WebTools")
    }

    fn register_handlers(&self, table: &mut HandlerTable) {
        let settings = Arc::new(self.settings.clone());

        let on_ping = Arc::clone(&settings);
        table.add(
            DEFAULT_GROUP,
            Handler::new(
                command(&["ping"]).and(self.privileges.sudo_filter()),
                move |ctx| rtt(ctx, Arc::clone(&on_ping)),
            )
            .named("webtools.ping")
            .detached(true),
        );

        table.add(
            DEFAULT_GROUP,
            Handler::new(command(&["cping"]).and(self.privileges.sudo_filter()), cping)
                .named("webtools.cping")
                .detached(true),
        );

        let on_ip = Arc::clone(&settings);
        table.add(
            DEFAULT_GROUP,
            Handler::new(
                command(&["ip"]).and(self.privileges.owner_chat()),
                move |ctx| bot_ip(ctx, Arc::clone(&on_ip)),
            )
            .named("webtools.ip")
            .detached(true),
        );
    }
}

/// Reply for a measured round trip, `/ping` style.
fn rtt_text(time: PingTime) -> String {
    if time.under {
        format!(" Round-trip time is {time}")
    } else {
        format!(" Round-trip time: {time}")
    }
}

/// Reply for a measured host, `/cping` style.
fn host_text(host: &str, time: PingTime) -> String {
    if time.under {
        format!(" Ping speed of {host} is {time}")
    } else {
        format!(" Ping speed of {host}: {time}")
    }
}

/// What `/cping` should do with its arguments.
#[derive(Debug, PartialEq, Eq)]
enum CpingRequest<'a> {
    Host(&'a str),
    Missing,
    TooMany,
}

impl<'a> CpingRequest<'a> {
    fn from_args(args: &[&'a str]) -> Self {
        match *args {
            [] => Self::Missing,
            [host] => Self::Host(host),
            _ => Self::TooMany,
        }
    }
}

async fn rtt(ctx: Arc<DispatchContext>, settings: Arc<Settings>) -> ActionResult {
    let time = ping_host(&settings.dc_address).await?;
    debug!(address = %settings.dc_address, millis = time.millis, "Measured round trip");
    ctx.reply_text(&rtt_text(time)).await?;
    Ok(Outcome::Continue)
}

async fn cping(ctx: Arc<DispatchContext>) -> ActionResult {
    let args = ctx.args();
    let host = match CpingRequest::from_args(&args) {
        CpingRequest::Host(host) => host,
        CpingRequest::Missing => {
            ctx.reply_text("Give me an address to ping!").await?;
            return Ok(Outcome::Continue);
        }
        CpingRequest::TooMany => {
            ctx.reply_text("Too many arguments!").await?;
            return Ok(Outcome::Continue);
        }
    };

    match ping_host(host).await {
        Ok(time) => ctx.reply_text(&host_text(host, time)).await?,
        Err(e) => {
            debug!(host, error = %e, "Ping failed");
            ctx.reply_text("There was a problem parsing the IP/Hostname")
                .await?
        }
    };
    Ok(Outcome::Continue)
}

async fn public_ip(settings: &Settings) -> ModuleResult<String> {
    let body = settings
        .client
        .get(&settings.ip_endpoint)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(body.trim().to_string())
}

async fn bot_ip(ctx: Arc<DispatchContext>, settings: Arc<Settings>) -> ActionResult {
    let ip = public_ip(&settings).await?;
    info!("Sent the bot's public address to the owner");
    ctx.reply_text(&ip).await?;
    Ok(Outcome::Continue)
}
