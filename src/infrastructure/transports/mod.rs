pub mod http;
pub mod stream;
pub mod websocket;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::HttpRoute;
use crate::domain::models::TransportBox;
use crate::domain::models::TransportKind;

/// Everything needed to build a transport for a single delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportSettings {
    pub api_url: String,
    pub ws_url: String,
    pub relay_url: String,
    pub http_route: HttpRoute,
    pub timeout: Duration,
}

impl TransportSettings {
    pub fn from_config() -> Result<TransportSettings> {
        let route_name = Config::get(ConfigKey::HttpRoute);
        let http_route = match HttpRoute::parse(&route_name) {
            Some(route) => route,
            None => bail!(format!("No HTTP route named {route_name}")),
        };

        return Ok(TransportSettings {
            api_url: Config::get(ConfigKey::ApiURL),
            ws_url: Config::get(ConfigKey::WsURL),
            relay_url: Config::get(ConfigKey::RelayURL),
            http_route,
            timeout: Duration::from_millis(Config::get(ConfigKey::DeliveryTimeout).parse::<u64>()?),
        });
    }
}

pub struct TransportManager {}

impl TransportManager {
    /// Builds a fresh transport. Transports are never shared between
    /// attempts, so each one owns its connection for exactly one reply.
    pub fn get(kind: TransportKind, settings: &TransportSettings) -> TransportBox {
        match kind {
            TransportKind::WebSocket => {
                return Box::new(websocket::WebSocket::new(&settings.ws_url, settings.timeout));
            }
            TransportKind::Http => {
                let base_url = if settings.http_route == HttpRoute::Relay {
                    &settings.relay_url
                } else {
                    &settings.api_url
                };
                return Box::new(http::Http::new(base_url, settings.http_route));
            }
            TransportKind::Stream => {
                return Box::new(stream::RelayStream::new(&settings.relay_url));
            }
        }
    }
}
