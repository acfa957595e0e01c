// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation

use std::time::Duration;

/// Configuration for connecting to a Ness alarm panel.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Panel host (an IP232 module or other serial-to-TCP bridge)
    pub host: String,
    /// Panel TCP port (default: 23)
    pub port: u16,
    /// Address encoded into outgoing user-interface packets
    pub address: u8,
    /// Whether to infer the arming state, working around panels (<v5.8)
    /// that emit an empty arming status while armed
    pub infer_arming_state: bool,
    /// Interval between periodic S00/S14 status update polls
    pub update_interval: Duration,
    /// Delay before re-establishing a dropped connection
    pub reconnect_delay: Duration,
    /// Whether to validate frame checksums on decode
    pub verify_checksums: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "192.168.0.100".to_string(),
            port: 23,
            address: 0x00,
            infer_arming_state: true,
            update_interval: Duration::from_secs(60),
            reconnect_delay: Duration::from_secs(1),
            verify_checksums: true,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn address(mut self, address: u8) -> Self {
        self.config.address = address;
        self
    }

    pub fn infer_arming_state(mut self, infer: bool) -> Self {
        self.config.infer_arming_state = infer;
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.config.update_interval = interval;
        self
    }

    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.config.verify_checksums = verify;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 23);
        assert_eq!(config.address, 0x00);
        assert!(config.infer_arming_state);
        assert!(config.verify_checksums);
        assert_eq!(config.update_interval, Duration::from_secs(60));
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .host("10.0.0.1")
            .port(2401)
            .address(0x01)
            .infer_arming_state(false)
            .update_interval(Duration::from_secs(30))
            .verify_checksums(false)
            .build();

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 2401);
        assert_eq!(config.address, 0x01);
        assert!(!config.infer_arming_state);
        assert_eq!(config.update_interval, Duration::from_secs(30));
        assert!(!config.verify_checksums);
    }
}
