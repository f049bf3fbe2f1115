//! HTTP front end.
//!
//! `GET /` serves the form, `POST /solve` runs the planner on the submitted
//! form and answers with the JSON [`TripReport`](crate::solution::TripReport).
//! The pipeline is blocking (network lookups, MILP solve) and runs on the
//! blocking thread pool, one request per pipeline run.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::exact::MilpSolver;
use crate::geo::GeoService;
use crate::instance::Objective;
use crate::planner::{parse_positive, plan_trip, TripRequest};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub geo: Arc<dyn GeoService + Send + Sync>,
    pub solver: Arc<dyn MilpSolver + Send + Sync>,
}

impl AppState {
    pub fn new(
        geo: Arc<dyn GeoService + Send + Sync>,
        solver: Arc<dyn MilpSolver + Send + Sync>,
    ) -> Self {
        AppState { geo, solver }
    }
}

/// Build the Axum router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/solve", post(solve))
        .route("/health", get(health))
        .with_state(state)
}

/// Fields of the planning form. Everything is optional at this level so that
/// missing or malformed values get a descriptive 400 rather than a generic
/// extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SolveForm {
    #[serde(rename = "minimizeChoice")]
    pub minimize_choice: Option<String>,
    #[serde(rename = "startingAddress")]
    pub starting_address: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address4: Option<String>,
    pub address5: Option<String>,
    pub address6: Option<String>,
    pub address7: Option<String>,
    pub address8: Option<String>,
    pub address9: Option<String>,
    #[serde(rename = "vehicleMPG")]
    pub vehicle_mpg: Option<String>,
    #[serde(rename = "gasPrice")]
    pub gas_price: Option<String>,
}

impl SolveForm {
    /// Supplied stops, `address2` through `address9` in order
    fn stops(&self) -> Vec<&str> {
        [
            &self.address2,
            &self.address3,
            &self.address4,
            &self.address5,
            &self.address6,
            &self.address7,
            &self.address8,
            &self.address9,
        ]
        .into_iter()
        .filter_map(|a| a.as_deref())
        .collect()
    }

    pub fn to_request(&self) -> Result<TripRequest, PlannerError> {
        let objective: Objective = self
            .minimize_choice
            .as_deref()
            .ok_or_else(|| PlannerError::InvalidInput("minimizeChoice is required".to_string()))?
            .parse()
            .map_err(PlannerError::InvalidInput)?;
        let vehicle_mpg = parse_positive("vehicleMPG", self.vehicle_mpg.as_deref())?;
        let gas_price = parse_positive("gasPrice", self.gas_price.as_deref())?;

        TripRequest::new(
            self.starting_address.as_deref().unwrap_or_default(),
            self.stops().as_slice(),
            objective,
            vehicle_mpg,
            gas_price,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for PlannerError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Rejected request: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn solve(
    State(state): State<AppState>,
    form: Result<Form<SolveForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            return PlannerError::InvalidInput(format!("malformed form: {}", rejection.body_text()))
                .into_response()
        }
    };
    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    info!(
        "Solve request: {} addresses, minimize {}",
        request.addresses.len(),
        request.objective
    );

    let result = tokio::task::spawn_blocking(move || {
        plan_trip(state.geo.as_ref(), state.solver.as_ref(), &request)
    })
    .await;

    match result {
        Ok(Ok(report)) => Json(report).into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(join) => PlannerError::Internal(format!("planning task failed: {}", join)).into_response(),
    }
}
