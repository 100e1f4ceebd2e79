use std::time::Duration;

use bevy::prelude::*;
use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";

/// Knobs the view reads at runtime, injected by the binary.
#[derive(Resource, Clone, Debug)]
pub struct BoardSettings {
    /// Relative endpoints from the server are resolved against this.
    pub base_url: Url,
    pub new_game_url: Option<String>,
    /// Pause between placing the player's mark and sending it, so the
    /// placement animation finishes before the reply is drawn.
    pub move_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            new_game_url: None,
            move_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Error, Debug)]
#[error("cannot resolve endpoint {endpoint}")]
pub struct EndpointError {
    pub endpoint: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl BoardSettings {
    pub fn resolve(&self, endpoint: &str) -> Result<Url, EndpointError> {
        self.base_url.join(endpoint).map_err(|e| EndpointError {
            endpoint: endpoint.to_string(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_endpoints() {
        let settings = BoardSettings::default();
        assert_eq!(
            settings.resolve("/games/3/move").unwrap().as_str(),
            "http://127.0.0.1:8000/games/3/move"
        );
        assert_eq!(
            settings.resolve("https://ttt.example/move").unwrap().as_str(),
            "https://ttt.example/move"
        );
    }

    #[test]
    fn unresolvable_endpoint_keeps_its_name() {
        let err = BoardSettings::default().resolve("http://[::1").unwrap_err();
        assert_eq!(err.endpoint, "http://[::1");
        assert!(std::error::Error::source(&err).is_some());
    }
}
