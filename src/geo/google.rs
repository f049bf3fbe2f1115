//! Google Maps Platform adapter (Geocoding + Directions APIs).

use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Coordinates, Directions, GeoService, Step};
use crate::config::GoogleMapsConfig;

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// GET a JSON document; transport errors and non-2xx replies are logged
    /// and reported as `None`.
    fn fetch_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Option<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<T>());

        match response {
            Ok(body) => Some(body),
            Err(err) => {
                warn!("Request to {} failed: {}", url, err);
                None
            }
        }
    }
}

impl GeoService for GoogleMapsClient {
    fn geocode(&self, address: &str) -> Option<Coordinates> {
        let query = [
            ("address", address.to_string()),
            ("key", self.config.api_key.clone()),
        ];
        let body: GeocodeResponse = self.fetch_json(&self.config.geocode_url, &query)?;
        body.log_service_status("geocode");

        let coords = body.first_location();
        if coords.is_none() {
            warn!("Unable to find coordinates for address: {}", address);
        }
        coords
    }

    fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions> {
        let query = [
            ("origin", origin.to_string()),
            ("destination", destination.to_string()),
            ("key", self.config.api_key.clone()),
        ];
        let body: DirectionsResponse = self.fetch_json(&self.config.directions_url, &query)?;
        body.log_service_status("directions");

        let directions = body.into_directions();
        if directions.is_none() {
            warn!("Unable to retrieve driving directions from {} to {}", origin, destination);
        }
        directions
    }

    fn embed_map_url(&self, origin: Coordinates, waypoints: &[Coordinates]) -> String {
        let waypoints = waypoints
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join("|");

        format!(
            "{}?key={}&origin={}&destination={}&waypoints={}&mode=driving",
            self.config.embed_url, self.config.api_key, origin, origin, waypoints
        )
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    fn first_location(&self) -> Option<Coordinates> {
        self.results
            .first()
            .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
    }

    fn log_service_status(&self, api: &str) {
        log_status(api, &self.status, self.error_message.as_deref());
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    distance: TextValue,
    duration: TextValue,
    #[serde(default)]
    steps: Vec<RouteStep>,
}

#[derive(Debug, Deserialize)]
struct RouteStep {
    #[serde(default)]
    html_instructions: String,
    distance: TextValue,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    text: String,
    value: f64,
}

impl DirectionsResponse {
    /// First leg of the first route, if any.
    fn into_directions(self) -> Option<Directions> {
        let leg = self.routes.into_iter().next()?.legs.into_iter().next()?;
        let steps = leg
            .steps
            .into_iter()
            .map(|s| Step::new(s.html_instructions, s.distance.text))
            .collect();

        Some(Directions {
            distance_meters: leg.distance.value,
            duration_seconds: leg.duration.value,
            steps,
        })
    }

    fn log_service_status(&self, api: &str) {
        log_status(api, &self.status, self.error_message.as_deref());
    }
}

fn log_status(api: &str, status: &str, message: Option<&str>) {
    if !status.is_empty() && status != "OK" {
        match message {
            Some(msg) => warn!("Google {} API returned {}: {}", api, status, msg),
            None => warn!("Google {} API returned {}", api, status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GEOCODE_OK: &str = r#"{
        "results": [
            {
                "formatted_address": "1600 Amphitheatre Pkwy, Mountain View, CA 94043, USA",
                "geometry": { "location": { "lat": 37.4224764, "lng": -122.0842499 } }
            }
        ],
        "status": "OK"
    }"#;

    const DIRECTIONS_OK: &str = r#"{
        "routes": [
            {
                "legs": [
                    {
                        "distance": { "text": "2.0 mi", "value": 3219 },
                        "duration": { "text": "7 mins", "value": 420 },
                        "steps": [
                            {
                                "html_instructions": "Head <b>north</b> on Main St",
                                "distance": { "text": "0.5 mi", "value": 805 }
                            },
                            {
                                "html_instructions": "Turn <b>right</b> onto Oak Ave",
                                "distance": { "text": "1.5 mi", "value": 2414 }
                            }
                        ]
                    }
                ]
            }
        ],
        "status": "OK"
    }"#;

    fn client() -> GoogleMapsClient {
        GoogleMapsClient::new(GoogleMapsConfig::with_api_key("KEY")).unwrap()
    }

    #[test]
    fn test_geocode_first_result() {
        let body: GeocodeResponse = serde_json::from_str(GEOCODE_OK).unwrap();
        let coords = body.first_location().unwrap();
        assert_eq!(coords, Coordinates::new(37.4224764, -122.0842499));
    }

    #[test]
    fn test_geocode_zero_results() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(body.first_location().is_none());
    }

    #[test]
    fn test_geocode_denied_without_results_field() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"error_message": "The provided API key is invalid.", "status": "REQUEST_DENIED"}"#,
        )
        .unwrap();
        assert!(body.first_location().is_none());
        assert_eq!(body.status, "REQUEST_DENIED");
    }

    #[test]
    fn test_directions_first_leg() {
        let body: DirectionsResponse = serde_json::from_str(DIRECTIONS_OK).unwrap();
        let directions = body.into_directions().unwrap();

        assert_eq!(directions.distance_meters, 3219.0);
        assert_eq!(directions.duration_seconds, 420.0);
        assert!((directions.distance_miles() - 2.0).abs() < 0.01);
        assert_eq!(
            directions.steps,
            vec![
                Step::new("Head <b>north</b> on Main St", "0.5 mi"),
                Step::new("Turn <b>right</b> onto Oak Ave", "1.5 mi"),
            ]
        );
    }

    #[test]
    fn test_directions_no_route() {
        let body: DirectionsResponse =
            serde_json::from_str(r#"{"routes": [], "status": "ZERO_RESULTS"}"#).unwrap();
        assert!(body.into_directions().is_none());

        let body: DirectionsResponse =
            serde_json::from_str(r#"{"routes": [{"legs": []}], "status": "OK"}"#).unwrap();
        assert!(body.into_directions().is_none());
    }

    #[test]
    fn test_embed_map_url_round_trip() {
        let url = client().embed_map_url(
            Coordinates::new(1.5, 2.5),
            &[Coordinates::new(3.0, 4.0), Coordinates::new(5.0, 6.0)],
        );
        assert_eq!(
            url,
            "https://www.google.com/maps/embed/v1/directions?key=KEY&origin=1.5,2.5&destination=1.5,2.5&waypoints=3,4|5,6&mode=driving"
        );
    }

    #[test]
    fn test_transport_failure_is_absent() {
        let config = GoogleMapsConfig {
            api_key: "KEY".to_string(),
            geocode_url: "http://127.0.0.1:9/geocode".to_string(),
            directions_url: "http://127.0.0.1:9/directions".to_string(),
            timeout_secs: 1,
            ..Default::default()
        };
        let client = GoogleMapsClient::new(config).unwrap();
        assert!(client.geocode("anywhere").is_none());
        assert!(client
            .directions(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 1.0))
            .is_none());
    }
}
