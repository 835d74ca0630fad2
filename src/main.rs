//! A command line interface to the shopping route planner.

use clap::{Arg, ArgMatches, Command};
use shopping_router::models::GroceryList;
use shopping_router::oracle::{CancellationToken, DistanceProvider, TravelMode};
use shopping_router::utils::cache::{load_cost_table, save_cost_table};
use shopping_router::utils::{GreatCircleDistance, RoadNetwork, StaticGeocoder};
use shopping_router::{RoutePlan, RoutePlanner, RouteRequest, RouterConfig};
use std::error::Error;
use std::fs;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn get_plan_app() -> Command {
    Command::new("plan")
        .about("Plans a store route covering a grocery list")
        .arg(
            Arg::new("request")
                .help("Route request JSON file (start, stores, items)")
                .long("request")
                .short('r')
                .required(true),
        )
        .arg(
            Arg::new("geocodes")
                .help("JSON file mapping addresses to {\"lng\", \"lat\"}")
                .long("geocodes")
                .short('g')
                .required(true),
        )
        .arg(
            Arg::new("road-vertices")
                .help("Road vertices file (id lng lat); straight-line estimates are used without it")
                .long("road-vertices")
                .requires("road-edges"),
        )
        .arg(
            Arg::new("road-edges")
                .help("Road edges file (id start end)")
                .long("road-edges")
                .requires("road-vertices"),
        )
        .arg(
            Arg::new("mode")
                .help("Travel mode: driving, walking or cycling")
                .long("mode")
                .short('m'),
        )
        .arg(
            Arg::new("cache")
                .help("Cost table cache file, reused when it matches the request's mode and locations")
                .long("cache")
                .short('c'),
        )
}

fn get_parse_list_app() -> Command {
    Command::new("parse-list")
        .about("Normalizes a comma-separated grocery list")
        .arg(Arg::new("text").help("List text, e.g. \"Apples, milk\"").required(true))
}

fn run_parse_list(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let text = matches.get_one::<String>("text").map(String::as_str).unwrap_or_default();
    let list = GroceryList::parse(text);
    println!("{}", serde_json::to_string(&list.into_target_set())?);
    Ok(())
}

fn run_plan(matches: &ArgMatches, cancel: CancellationToken) -> Result<(), Box<dyn Error>> {
    let mut config = RouterConfig::load()?;
    if let Some(mode) = matches.get_one::<String>("mode") {
        config.travel_mode = mode.parse::<TravelMode>()?;
    }

    let request_path = matches
        .get_one::<String>("request")
        .ok_or("missing --request")?;
    let request: RouteRequest = serde_json::from_str(&fs::read_to_string(request_path)?)?;

    let geocodes_path = matches
        .get_one::<String>("geocodes")
        .ok_or("missing --geocodes")?;
    let geocoder = StaticGeocoder::load(geocodes_path)?;
    info!(addresses = geocoder.len(), "loaded geocodes");

    let distances: Box<dyn DistanceProvider> = match (
        matches.get_one::<String>("road-vertices"),
        matches.get_one::<String>("road-edges"),
    ) {
        (Some(vertices), Some(edges)) => {
            let network = RoadNetwork::load(vertices, edges)?;
            info!(vertices = network.vertex_count(), "loaded road network");
            Box::new(network)
        }
        _ => Box::new(GreatCircleDistance),
    };

    let planner = RoutePlanner::new(geocoder, distances, &config)?;
    let cache_path = matches.get_one::<String>("cache");
    let cached = match cache_path {
        Some(path) => load_cost_table(path)?,
        None => None,
    };

    let (plan, fresh) = planner.plan_cached(&request, cached.as_ref(), &cancel)?;
    if let (Some(path), Some(fresh)) = (cache_path, fresh) {
        save_cost_table(&fresh, path)?;
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &RoutePlan) {
    println!("Shopping route ({} stops):", plan.route.len());
    println!("------------------------------------------");
    for (i, visit) in plan.route.visits.iter().enumerate() {
        let items: Vec<&str> = visit.new_items.iter().map(|item| item.as_str()).collect();
        println!("{}. {} ({:.2} mi)", i + 1, visit.store, visit.leg_cost);
        println!("   buy: {}", items.join(", "));
    }
    println!("Total travel: {:.2} miles", plan.route.total_cost());

    for store in &plan.skipped_stores {
        println!("  skipped (address not found): {}", store);
    }
    for store in &plan.unusable_stores {
        println!("  unreachable: {}", store);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Shopping Route Planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plans a low-cost route through stores that together stock a grocery list")
        .subcommand_required(true)
        .subcommand(get_plan_app())
        .subcommand(get_parse_list_app())
        .get_matches();

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        error!(error = %e, "cannot install interrupt handler");
    }

    let result = match matches.subcommand() {
        Some(("plan", plan_matches)) => run_plan(plan_matches, cancel),
        Some(("parse-list", list_matches)) => run_parse_list(list_matches),
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
