use crate::window::WindowSelector;
use std::{env, net::SocketAddr, str::FromStr};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Where window statistics come from when no zoom is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsSource {
    /// `GET /api/stats` for the selected window.
    #[default]
    Remote,
    /// Computed from the entries already loaded for the window.
    Local,
}

impl FromStr for StatsSource {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "remote" => Ok(StatsSource::Remote),
            "local" => Ok(StatsSource::Local),
            other => Err(format!("unknown stats source {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub port: u16,
    pub api_url: String,
    pub initial_window: WindowSelector,
    pub stats_source: StatsSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_url: DEFAULT_API_URL.to_owned(),
            initial_window: WindowSelector::AllTime,
            stats_source: StatsSource::Remote,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`; bad values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let api_url = lookup("PHYSIOLOG_API_URL")
            .map(|value| value.trim().trim_end_matches('/').to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_url);

        let initial_window = match lookup("DASHBOARD_WINDOW") {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!("ignoring DASHBOARD_WINDOW: {err}");
                defaults.initial_window
            }),
            None => defaults.initial_window,
        };

        let stats_source = match lookup("DASHBOARD_STATS_SOURCE") {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!("ignoring DASHBOARD_STATS_SOURCE: {err}");
                defaults.stats_source
            }),
            None => defaults.stats_source,
        };

        Self {
            port,
            api_url,
            initial_window,
            stats_source,
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
