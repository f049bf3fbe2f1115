//! End-to-end trip planning: validate, geocode, build the matrix, solve,
//! assemble and price.

use log::{debug, info, warn};

use crate::assembler::assemble;
use crate::cost::{estimate_fuel_cost, round2};
use crate::error::{PlannerError, Result};
use crate::exact::MilpSolver;
use crate::geo::{GeoService, MemoizedGeo};
use crate::instance::{Location, Objective, TravelMatrix};
use crate::optimizer::RouteOptimizer;
use crate::solution::TripReport;

/// Start address plus up to eight stops
pub const MAX_LOCATIONS: usize = 9;

/// A validated planning request
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    /// Start/end address first, then the stops in input order
    pub addresses: Vec<String>,
    pub objective: Objective,
    pub vehicle_mpg: f64,
    pub gas_price: f64,
}

impl TripRequest {
    /// Validate raw inputs. Blank stops are dropped; everything else that is
    /// wrong is rejected before any lookup happens.
    pub fn new<S: AsRef<str>>(
        starting_address: &str,
        stops: &[S],
        objective: Objective,
        vehicle_mpg: f64,
        gas_price: f64,
    ) -> Result<Self> {
        let start = starting_address.trim();
        if start.is_empty() {
            return Err(PlannerError::InvalidInput(
                "a starting address is required".to_string(),
            ));
        }

        let mut addresses = vec![start.to_string()];
        addresses.extend(
            stops
                .iter()
                .map(|s| s.as_ref().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );

        if addresses.len() < 2 {
            return Err(PlannerError::InvalidInput(
                "at least one address besides the starting address is required".to_string(),
            ));
        }
        if addresses.len() > MAX_LOCATIONS {
            return Err(PlannerError::InvalidInput(format!(
                "at most {} addresses are supported, got {}",
                MAX_LOCATIONS,
                addresses.len()
            )));
        }

        Ok(TripRequest {
            addresses,
            objective,
            vehicle_mpg: require_positive("vehicleMPG", vehicle_mpg)?,
            gas_price: require_positive("gasPrice", gas_price)?,
        })
    }
}

fn require_positive(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(PlannerError::InvalidInput(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}

/// Parse a required positive number from a form field
pub fn parse_positive(field: &str, raw: Option<&str>) -> Result<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        PlannerError::InvalidInput(format!("{} is required", field))
    })?;
    let value: f64 = raw.parse().map_err(|_| {
        PlannerError::InvalidInput(format!("{} must be a number, got '{}'", field, raw))
    })?;
    require_positive(field, value)
}

/// Run the whole pipeline for one request.
///
/// Lookups go through a request-scoped cache, so each address is geocoded
/// once and each ordered pair costs one directions call.
pub fn plan_trip<G: GeoService + Sync + ?Sized>(
    geo: &G,
    solver: &dyn MilpSolver,
    request: &TripRequest,
) -> Result<TripReport> {
    let geo = MemoizedGeo::new(geo);

    let locations: Vec<Location> = request
        .addresses
        .iter()
        .enumerate()
        .map(|(k, address)| Location::resolve(k + 1, address, &geo))
        .collect();
    let unresolved = locations.iter().filter(|l| l.coords.is_none()).count();
    if unresolved > 0 {
        warn!("{} of {} addresses could not be geocoded", unresolved, locations.len());
    }
    info!(
        "Planning round trip over {} locations, minimizing {}",
        locations.len(),
        request.objective
    );

    let matrix = TravelMatrix::build(&locations, &geo);
    info!(
        "Travel matrix ready: {} usable arcs, {} missing",
        matrix.arcs().count(),
        matrix.missing_arcs()
    );

    let tour = RouteOptimizer::new(solver)
        .solve(&matrix, request.objective)
        .map_err(PlannerError::Solver)?;
    debug!("{}", tour);
    if !tour.is_optimal() {
        info!("No optimal tour ({}); skipping route assembly", tour.status);
        return Ok(TripReport::without_route(tour.status));
    }

    let route = assemble(0, &tour.arcs, &locations, &geo)?;

    let mut total_distance = 0.0;
    let mut total_seconds = 0.0;
    for (i, j) in tour.arcs.iter() {
        let leg = matrix.leg(i, j).ok_or_else(|| {
            PlannerError::Consistency(format!("selected arc {} -> {} has no leg", i + 1, j + 1))
        })?;
        total_distance += leg.distance_miles;
        total_seconds += leg.duration_seconds;
    }

    let fuel_cost = estimate_fuel_cost(total_distance, request.vehicle_mpg, request.gas_price);
    info!(
        "Round trip: {:.2} mi, {:.2} h, fuel {:.2}",
        total_distance,
        total_seconds / 3600.0,
        fuel_cost
    );

    let turn_by_turn_directions = route
        .legs
        .iter()
        .map(|leg| {
            leg.directions
                .clone()
                .map(|steps| steps.into_iter().map(|s| s.into_pair()).collect())
        })
        .collect();

    Ok(TripReport {
        status: tour.status,
        total_distance: Some(round2(total_distance)),
        total_duration: Some(round2(total_seconds / 3600.0)),
        estimated_fuel_cost: Some(fuel_cost),
        ordered_path: route.ordered_path(),
        turn_by_turn_directions,
        map_url: route.map_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_drops_blank_stops() {
        let request = TripRequest::new(
            " 1 Main St ",
            &["", "2 Oak Ave", "   ", "3 Elm Rd"],
            Objective::Distance,
            25.0,
            3.5,
        )
        .unwrap();

        assert_eq!(request.addresses, vec!["1 Main St", "2 Oak Ave", "3 Elm Rd"]);
    }

    #[test]
    fn test_request_requires_start_and_a_stop() {
        let err = TripRequest::new("  ", &["2 Oak Ave"], Objective::Distance, 25.0, 3.5).unwrap_err();
        assert!(err.is_client_error());

        let none: [&str; 0] = [];
        let err = TripRequest::new("1 Main St", &none, Objective::Distance, 25.0, 3.5).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_request_caps_locations() {
        let stops: Vec<String> = (2..=10).map(|i| format!("{} Main St", i)).collect();
        let err = TripRequest::new("1 Main St", stops.as_slice(), Objective::Duration, 25.0, 3.5).unwrap_err();
        assert!(err.is_client_error());

        let request = TripRequest::new("1 Main St", &stops[..8], Objective::Duration, 25.0, 3.5).unwrap();
        assert_eq!(request.addresses.len(), MAX_LOCATIONS);
    }

    #[test]
    fn test_zero_mpg_rejected() {
        let err = TripRequest::new("a", &["b"], Objective::Distance, 0.0, 3.5).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidInput(ref m) if m.contains("vehicleMPG")));

        assert!(TripRequest::new("a", &["b"], Objective::Distance, f64::NAN, 3.5).is_err());
        assert!(TripRequest::new("a", &["b"], Objective::Distance, 25.0, -1.0).is_err());
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("vehicleMPG", Some(" 27.5 ")).unwrap(), 27.5);
        assert!(parse_positive("vehicleMPG", Some("0")).is_err());
        assert!(parse_positive("vehicleMPG", Some("fast")).is_err());
        assert!(parse_positive("vehicleMPG", Some("")).is_err());
        assert!(parse_positive("gasPrice", None).is_err());
        assert!(parse_positive("gasPrice", Some("inf")).is_err());
    }
}
