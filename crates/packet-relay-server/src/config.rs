//! Command line / environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use packet_relay_core::EchoPolicy;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address both listeners bind to.
    #[arg(long, env = "RELAY_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port of the registration/diagnostics API.
    #[arg(long, env = "API_PORT", default_value_t = 3000)]
    pub api_port: u16,

    /// Port of the WebSocket endpoint. Set equal to `api_port` to serve both
    /// on one listener.
    #[arg(long, env = "WS_PORT", default_value_t = 4000)]
    pub ws_port: u16,

    /// WebSocket base URL advertised by the registration endpoint.
    #[arg(long, env = "PUBLIC_WS_URL")]
    pub public_ws_url: Option<String>,

    /// Deliver a publisher's events back to the publisher itself.
    #[arg(long, env = "ECHO_TO_SENDER", default_value_t = true, action = clap::ArgAction::Set)]
    pub echo_to_sender: bool,
}

impl Config {
    #[must_use]
    pub const fn api_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.api_port)
    }

    #[must_use]
    pub const fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.ws_port)
    }

    /// Whether the API and WebSocket endpoint share one listener.
    #[must_use]
    pub const fn shared_port(&self) -> bool {
        self.api_port == self.ws_port
    }

    #[must_use]
    pub fn public_ws_url(&self) -> String {
        self.public_ws_url
            .clone()
            .unwrap_or_else(|| format!("ws://localhost:{}", self.ws_port))
    }

    #[must_use]
    pub const fn echo_policy(&self) -> EchoPolicy {
        if self.echo_to_sender {
            EchoPolicy::Include
        } else {
            EchoPolicy::SkipSender
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse_from(["packet-relay"]);
        assert_eq!(config.api_port, 3000);
        assert_eq!(config.ws_port, 4000);
        assert!(!config.shared_port());
        assert_eq!(config.public_ws_url(), "ws://localhost:4000");
        assert_eq!(config.echo_policy(), EchoPolicy::Include);
    }

    #[test]
    fn test_shared_port_and_echo_flag() {
        let config = Config::parse_from([
            "packet-relay",
            "--api-port",
            "8080",
            "--ws-port",
            "8080",
            "--echo-to-sender",
            "false",
        ]);
        assert!(config.shared_port());
        assert_eq!(config.ws_addr().port(), 8080);
        assert_eq!(config.echo_policy(), EchoPolicy::SkipSender);
    }
}
