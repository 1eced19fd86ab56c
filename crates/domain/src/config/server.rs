use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// When false the UDP listener is never started and only the
    /// signal and heartbeat producers run.
    #[serde(default = "default_listener_enabled")]
    pub listener_enabled: bool,
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.dns_port)
        } else {
            format!("{}:{}", self.bind_address, self.dns_port)
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            dns_port: default_dns_port(),
            bind_address: default_bind_address(),
            listener_enabled: default_listener_enabled(),
        }
    }
}

fn default_dns_port() -> u16 {
    1053
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listener_enabled() -> bool {
    true
}
