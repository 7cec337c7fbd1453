//! Client configuration
//!
//! Host and port are plain data handed to [`ChatClient::new`]; no
//! module-level constants or process-wide state.
//!
//! [`ChatClient::new`]: crate::client::ChatClient::new

use crate::DEFAULT_PORT;

/// Where the client connects. Pure configuration, no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}
