//! Round Trip Planner - Command Line Interface
//!
//! Serves the planning form over HTTP, or plans a single trip from the
//! command line and prints the JSON report.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use route_planner::config::{GoogleMapsConfig, ServerConfig, SolverConfig};
use route_planner::exact::default_solver;
use route_planner::geo::GoogleMapsClient;
use route_planner::instance::Objective;
use route_planner::planner::{plan_trip, TripRequest};
use route_planner::server::{build_router, AppState};

#[derive(Parser)]
#[command(name = "route-planner")]
#[command(version = "1.0")]
#[command(about = "Plans the optimal round trip through a set of addresses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:5003")]
        bind: SocketAddr,

        #[command(flatten)]
        maps: MapsArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },

    /// Plan one trip and print the report as JSON
    Solve {
        /// Starting (and ending) address
        #[arg(long)]
        start: String,

        /// Address to visit; repeat for each stop
        #[arg(long = "stop", required = true)]
        stops: Vec<String>,

        /// Quantity to minimize
        #[arg(short, long, value_enum, default_value = "distance")]
        minimize: Minimize,

        /// Vehicle fuel economy in miles per gallon
        #[arg(long)]
        mpg: f64,

        /// Fuel price per gallon
        #[arg(long)]
        gas_price: f64,

        #[command(flatten)]
        maps: MapsArgs,

        #[command(flatten)]
        solver: SolverArgs,
    },
}

#[derive(Args)]
struct MapsArgs {
    /// Google Maps Platform API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Timeout for each Google Maps request, in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,
}

impl MapsArgs {
    fn into_config(self) -> GoogleMapsConfig {
        GoogleMapsConfig {
            timeout_secs: self.timeout_secs,
            ..GoogleMapsConfig::with_api_key(self.api_key)
        }
    }
}

#[derive(Args)]
struct SolverArgs {
    /// MILP time limit in seconds
    #[arg(short, long, default_value = "60")]
    time_limit: f64,

    /// Verbose solver output
    #[arg(short, long)]
    verbose: bool,
}

impl SolverArgs {
    fn into_config(self) -> SolverConfig {
        SolverConfig {
            time_limit: self.time_limit,
            verbose: self.verbose,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Minimize {
    /// Longest single leg duration
    Time,
    /// Total distance driven
    Distance,
}

impl From<Minimize> for Objective {
    fn from(m: Minimize) -> Self {
        match m {
            Minimize::Time => Objective::Duration,
            Minimize::Distance => Objective::Distance,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { bind, maps, solver } => {
            serve(ServerConfig { bind }, maps.into_config(), solver.into_config())
        }
        Commands::Solve {
            start,
            stops,
            minimize,
            mpg,
            gas_price,
            maps,
            solver,
        } => solve_once(
            &start,
            &stops,
            minimize.into(),
            mpg,
            gas_price,
            maps.into_config(),
            solver.into_config(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn serve(server: ServerConfig, maps: GoogleMapsConfig, solver: SolverConfig) -> Result<()> {
    // The blocking HTTP client owns its own runtime; build it (and drop the
    // last handle) outside of tokio.
    let geo = Arc::new(GoogleMapsClient::new(maps).context("building Google Maps client")?);
    let solver = default_solver(&solver);
    info!("Using {} MILP backend", solver.name());

    let state = AppState::new(geo.clone(), Arc::from(solver));
    let router = build_router(state);

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(server.bind)
            .await
            .with_context(|| format!("binding {}", server.bind))?;
        info!("Listening on http://{}", server.bind);
        axum::serve(listener, router).await.context("serving HTTP")
    })?;

    drop(geo);
    Ok(())
}

fn solve_once(
    start: &str,
    stops: &[String],
    objective: Objective,
    mpg: f64,
    gas_price: f64,
    maps: GoogleMapsConfig,
    solver: SolverConfig,
) -> Result<()> {
    let request = TripRequest::new(start, stops, objective, mpg, gas_price)?;
    let geo = GoogleMapsClient::new(maps).context("building Google Maps client")?;
    let solver = default_solver(&solver);

    let report = plan_trip(&geo, solver.as_ref(), &request)?;
    info!("{}", report);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
