//! Round Trip Planner Library
//!
//! Plans a closed driving loop over a handful of addresses: every address is
//! geocoded, the pairwise driving legs are looked up, and the visiting order is
//! solved exactly as a MILP Traveling Salesman Problem with Miller-Tucker-Zemlin
//! subtour elimination. The result carries turn-by-turn directions, a fuel cost
//! estimate and an embeddable map URL.
//!
//! # Features
//!
//! - Exact TSP formulation minimizing total distance or the longest leg duration
//! - Pluggable MILP backends (pure-Rust microlp, Gurobi behind the `gurobi` feature)
//! - Google Maps geocoding and directions with request-scoped memoization
//! - HTTP form endpoint and one-shot CLI
//!
//! # Example
//!
//! ```no_run
//! use route_planner::config::{GoogleMapsConfig, SolverConfig};
//! use route_planner::exact::default_solver;
//! use route_planner::geo::GoogleMapsClient;
//! use route_planner::instance::Objective;
//! use route_planner::planner::{plan_trip, TripRequest};
//!
//! let geo = GoogleMapsClient::new(GoogleMapsConfig::with_api_key("KEY")).unwrap();
//! let solver = default_solver(&SolverConfig::default());
//! let request = TripRequest::new(
//!     "1600 Amphitheatre Pkwy, Mountain View, CA",
//!     &["1 Infinite Loop, Cupertino, CA", "Stanford, CA"],
//!     Objective::Distance,
//!     28.0,
//!     4.15,
//! )
//! .unwrap();
//!
//! let report = plan_trip(&geo, solver.as_ref(), &request).unwrap();
//! println!("{}", report);
//! ```

pub mod assembler;
pub mod config;
pub mod cost;
pub mod error;
pub mod exact;
pub mod geo;
pub mod instance;
pub mod optimizer;
pub mod planner;
pub mod server;
pub mod solution;

pub use error::PlannerError;
pub use instance::{Location, Objective, TravelMatrix};
pub use solution::{TourSolution, TripReport};
