//! Runtime configuration.
//!
//! Everything is loaded once at process start (see `main.rs`) and handed to
//! the components that need it. Nothing here is read from a global.

use std::net::SocketAddr;

/// Google Maps Platform settings used by the geospatial client
#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// API key sent with every geocoding / directions request and embedded in map URLs
    pub api_key: String,
    /// Geocoding endpoint
    pub geocode_url: String,
    /// Directions endpoint
    pub directions_url: String,
    /// Embeddable directions map endpoint
    pub embed_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        GoogleMapsConfig {
            api_key: String::new(),
            geocode_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            directions_url: "https://maps.googleapis.com/maps/api/directions/json".to_string(),
            embed_url: "https://www.google.com/maps/embed/v1/directions".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GoogleMapsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        GoogleMapsConfig {
            api_key: api_key.into(),
            ..Default::default()
        }
    }
}

/// MILP solver settings
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Time limit in seconds (backends without a time limit ignore it)
    pub time_limit: f64,
    /// Enable backend console output
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            time_limit: 60.0,
            verbose: false,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from(([127, 0, 0, 1], 5003)),
        }
    }
}
