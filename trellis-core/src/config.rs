//! Launch configuration, read from `TRELLIS_*` environment variables.
//!
//! The CLI sets these when it runs a project, so an application binary only
//! needs to call [`crate::run`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_MODE: &str = "TRELLIS_MODE";
pub const ENV_HOST: &str = "TRELLIS_HOST";
pub const ENV_PORT: &str = "TRELLIS_PORT";
pub const ENV_WS_PORT: &str = "TRELLIS_WS_PORT";
pub const ENV_OUTPUT: &str = "TRELLIS_OUTPUT";

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_OUTPUT: &str = "build";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: `{value}` is not a valid mode (expected `dev` or `build`)")]
    InvalidMode { var: &'static str, value: String },

    #[error("{var}: `{value}` is not a valid port")]
    InvalidPort { var: &'static str, value: String },

    #[error("port {0} leaves no room for the WebSocket listener on the next port")]
    NoWebSocketPort(u16),
}

/// What [`crate::run`] does with the application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Serve the application live with event round-trips.
    #[default]
    Dev,
    /// Write the static two-file build and exit.
    Build,
}

/// Error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}`")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "live" => Ok(Mode::Dev),
            "build" | "static" => Ok(Mode::Build),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Dev => "dev",
            Mode::Build => "build",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub host: String,
    /// HTTP port. `0` picks a free port.
    pub port: u16,
    /// WebSocket port. Defaults to `port + 1`, or a free port when `port` is 0.
    pub ws_port: Option<u16>,
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ws_port: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(value) = lookup(ENV_MODE) {
            config.mode = value.parse().map_err(|ParseModeError(value)| ConfigError::InvalidMode {
                var: ENV_MODE,
                value,
            })?;
        }
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(value) = lookup(ENV_PORT) {
            config.port = parse_port(ENV_PORT, value)?;
        }
        if let Some(value) = lookup(ENV_WS_PORT) {
            config.ws_port = Some(parse_port(ENV_WS_PORT, value)?);
        }
        if let Some(output) = lookup(ENV_OUTPUT).filter(|o| !o.trim().is_empty()) {
            config.output = PathBuf::from(output);
        }

        config.websocket_port()?;
        Ok(config)
    }

    /// The port the WebSocket listener binds.
    pub fn websocket_port(&self) -> Result<u16, ConfigError> {
        match (self.ws_port, self.port) {
            (Some(port), _) => Ok(port),
            (None, 0) => Ok(0),
            (None, port) => port.checked_add(1).ok_or(ConfigError::NoWebSocketPort(port)),
        }
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_port(var: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort { var, value })
}
