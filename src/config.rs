use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "fhe-debugger.toml";

/// Optional TOML configuration. Every field has a default so a partial file
/// works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerConfig {
    /// Base URL of the debugger backend.
    pub backend_url: String,
    /// Port the `serve` subcommand binds.
    pub port: u16,
    /// Whether views start with relinearize nodes visible.
    pub include_relinearize: bool,
    /// Request timeout in seconds for backend fetches.
    pub timeout_secs: u64,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        DebuggerConfig {
            backend_url: "http://127.0.0.1:8080".to_string(),
            port: 8080,
            include_relinearize: true,
            timeout_secs: 10,
        }
    }
}

impl DebuggerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let text = fs::read_to_string(&path)?;
        toml::from_str(&text).map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("parse {}: {err}", path.as_ref().display()),
            )
        })
    }

    /// Loads an explicit path, or `fhe-debugger.toml` when it exists, or the
    /// defaults.
    pub fn load_or_default(path: Option<&Path>) -> io::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(DebuggerConfig::default())
                }
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
