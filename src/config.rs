//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;
use url::Url;

use crate::error::Result;

/// Realtime database used by the hosted deployment
pub const DEFAULT_STORE_URL: &str = "https://time-koper-default-rtdb.europe-west1.firebasedatabase.app";

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "workshop-timer")]
#[command(about = "A synchronized countdown timer for facilitators and participants")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20553")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Base URL of the JSON state store
    #[arg(long, default_value = DEFAULT_STORE_URL)]
    pub store_url: String,

    /// Keep timers in process memory instead of the remote store
    #[arg(long)]
    pub in_memory: bool,

    /// Timeout for store requests in milliseconds
    #[arg(long, default_value = "5000")]
    pub store_timeout_ms: u64,

    /// Origin and path participants open; defaults to this server
    #[arg(long)]
    pub public_url: Option<String>,

    /// Image service that renders QR codes
    #[arg(long, default_value = "https://api.qrserver.com/v1/create-qr-code/")]
    pub qr_endpoint: String,

    /// QR code size in pixels
    #[arg(long, default_value = "180")]
    pub qr_size: u32,

    /// How often sessions re-read the store, in milliseconds
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// How often participant displays are recomputed, in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_interval_ms: u64,

    /// Release room sessions nobody has requested for this many seconds
    #[arg(long, default_value = "300")]
    pub session_idle_secs: u64,

    /// Title used when a timer is started without one
    #[arg(long, default_value = "Attività")]
    pub default_title: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings shared by every room session
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub tick_interval: Duration,
    /// Sessions unused for this long are released
    pub idle_timeout: Duration,
    pub public_url: Url,
    pub qr_endpoint: Url,
    pub qr_size: u32,
    pub default_title: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(100),
            idle_timeout: Duration::from_secs(300),
            public_url: Url::parse("http://localhost:20553/").expect("static URL"),
            qr_endpoint: Url::parse("https://api.qrserver.com/v1/create-qr-code/")
                .expect("static URL"),
            qr_size: 180,
            default_title: "Attività".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Public URL participants are sent to
    pub fn public_url(&self) -> Result<Url> {
        match &self.public_url {
            Some(url) => Ok(Url::parse(url)?),
            None => {
                let host = match self.host.as_str() {
                    "0.0.0.0" | "::" => "localhost",
                    host => host,
                };
                Ok(Url::parse(&format!("http://{}:{}/", host, self.port))?)
            }
        }
    }

    /// Build the settings handed to room sessions
    pub fn session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            idle_timeout: Duration::from_secs(self.session_idle_secs.max(1)),
            public_url: self.public_url()?,
            qr_endpoint: Url::parse(&self.qr_endpoint)?,
            qr_size: self.qr_size,
            default_title: self.default_title.clone(),
        })
    }
}
