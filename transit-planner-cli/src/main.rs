use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use clap::Parser;
use transit_planner_core::prelude::*;

/// Answers a single transit journey query against a GTFS feed (spec §6).
#[derive(Parser, Debug)]
#[command(name = "transit-planner", version, about)]
struct CliArgs {
    /// Directory containing the GTFS feed (stops.txt, routes.txt, ...).
    #[arg(long)]
    feed: PathBuf,

    /// Source stop id, as it appears in stops.txt.
    #[arg(long)]
    source_stop_id: String,

    /// Free-text destination, resolved by the geocoder.
    #[arg(long)]
    destination: String,

    /// Departure time HH:MM:SS; defaults to current wall-clock time.
    #[arg(long)]
    departure_time: Option<String>,

    /// Departure date YYYY-MM-DD; defaults to today.
    #[arg(long)]
    departure_date: Option<String>,

    /// Restrict to one GTFS route_type (0=Tram .. 7=other).
    #[arg(long)]
    route_type: Option<u16>,

    /// Maximum transfers, 0-2 (spec §6 default 2).
    #[arg(long, default_value_t = DEFAULT_MAX_TRANSFERS)]
    max_transfers: usize,

    /// Base URL of the geocoding provider (spec §6 "Concrete provider
    /// URL ... outside this specification's scope").
    #[arg(long)]
    geocoder_url: String,

    /// Wall-clock query budget in seconds; 0 disables the deadline
    /// entirely (spec §5 "Cancellation and timeouts").
    #[arg(long, default_value_t = DEFAULT_QUERY_BUDGET.as_secs())]
    query_budget_secs: u64,
}

fn parse_departure_time(raw: Option<&str>) -> u32 {
    let time = raw
        .and_then(|s| NaiveTime::parse_from_str(s, "%H:%M:%S").ok())
        .unwrap_or_else(|| Local::now().time());
    time.num_seconds_from_midnight()
}

fn parse_departure_date(raw: Option<&str>) -> NaiveDate {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();

    let feed = match load_feed(&args.feed) {
        Ok(feed) => feed,
        Err(e) => {
            log::error!("failed to load feed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let api_key = std::env::var("GEOCODER_API_KEY").unwrap_or_default();
    let geocoder = HttpGeocoder::new(args.geocoder_url.clone(), api_key);

    let query = Query {
        source_stop_id: args.source_stop_id.clone(),
        destination_place: args.destination.clone(),
        departure_time: parse_departure_time(args.departure_time.as_deref()),
        departure_date: parse_departure_date(args.departure_date.as_deref()),
        route_type_filter: args.route_type.map(RouteType::from_code),
        max_transfers: args.max_transfers,
        query_budget: (args.query_budget_secs > 0)
            .then(|| Duration::from_secs(args.query_budget_secs)),
    };

    match run_query(&feed, &geocoder, &query).await {
        Ok(QueryOutcome::Found(journey)) => {
            print_journey(&journey);
            ExitCode::SUCCESS
        }
        Ok(QueryOutcome::NotFound(reason)) => {
            println!("no journey: {reason:?}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("query failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn print_journey(journey: &Journey) {
    if let Some(walk) = &journey.walk {
        println!(
            "walk {:.0} m ({} min) from {} to {}",
            walk.distance_m, walk.duration_minutes, walk.from_stop, walk.to_stop
        );
    }
    for leg in &journey.legs {
        println!(
            "trip {} ({}): {} -> {}, dep {}, arr {}",
            leg.trip_id, leg.headsign, leg.from_stop, leg.to_stop, leg.departure_time, leg.arrival_time
        );
    }
    println!(
        "total {} min, {} transfer(s), {:.2} km from destination",
        journey.total_minutes(),
        journey.transfers(),
        journey.final_distance_km
    );
}
