//! Tidecast - Tide Resolution CLI
//!
//! Resolves tide state for a coordinate and prints the result. Exists so
//! the engine can be exercised end-to-end without the surrounding
//! logbook application.
//!
//! Usage:
//!   cargo run --release -- 51.08 1.17                       # current state
//!   cargo run --release -- 51.08 1.17 --date 2026-08-14 --days 2
//!
//! Environment:
//!   WORLDTIDES_API_KEY - enables the global forecast provider

use chrono::NaiveDate;
use std::env;
use tidecast::config::ServiceConfig;
use tidecast::model::{TideData, TideTrend};
use tidecast::resolver::TideResolver;

fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let mut positional: Vec<f64> = Vec::new();
    let mut date: Option<NaiveDate> = None;
    let mut days: u32 = 3;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--date" => {
                if i + 1 >= args.len() {
                    usage_and_exit(&args[0], "--date requires YYYY-MM-DD");
                }
                match NaiveDate::parse_from_str(&args[i + 1], "%Y-%m-%d") {
                    Ok(parsed) => date = Some(parsed),
                    Err(_) => usage_and_exit(&args[0], "--date must be YYYY-MM-DD"),
                }
                i += 2;
            }
            "--days" => {
                if i + 1 >= args.len() {
                    usage_and_exit(&args[0], "--days requires a number");
                }
                match args[i + 1].parse() {
                    Ok(parsed) => days = parsed,
                    Err(_) => usage_and_exit(&args[0], "--days must be a number"),
                }
                i += 2;
            }
            raw => {
                match raw.parse() {
                    Ok(value) => positional.push(value),
                    Err(_) => usage_and_exit(&args[0], &format!("unknown argument: {}", raw)),
                }
                i += 1;
            }
        }
    }

    if positional.len() != 2 {
        usage_and_exit(&args[0], "latitude and longitude are required");
    }
    let (latitude, longitude) = (positional[0], positional[1]);

    println!("🌊 Tidecast");
    println!("===========\n");

    let config = ServiceConfig::load();
    if config.worldtides_api_key.is_none() {
        println!("ℹ No WorldTides key configured; global forecast tier disabled\n");
    }
    let resolver = TideResolver::new(&config);

    let result = match date {
        Some(date) => resolver.get_tide_data_for_date(latitude, longitude, date, days),
        None => resolver.get_tide_data(latitude, longitude),
    };

    match result {
        Some(data) => print_result(&data),
        None => println!("No tide data available for ({}, {})", latitude, longitude),
    }
}

fn usage_and_exit(program: &str, problem: &str) -> ! {
    eprintln!("Error: {}", problem);
    eprintln!("Usage: {} LAT LNG [--date YYYY-MM-DD] [--days N]", program);
    std::process::exit(1);
}

fn print_result(data: &TideData) {
    println!(
        "📍 {} ({}) — {:.1} km away, source: {}",
        data.station.name,
        data.station.id,
        data.station.distance_km,
        data.station.source.as_str()
    );

    if let Some(current) = &data.current {
        let arrow = match current.trend {
            TideTrend::Rising => "↑ rising",
            TideTrend::Falling => "↓ falling",
        };
        println!("   Now: {:.2} m ({})", current.height_m, arrow);
        if let Some(next) = &current.next_tide {
            println!(
                "   Next turn: {:?} at {} ({:.2} m)",
                next.kind,
                next.time.format("%Y-%m-%d %H:%M UTC"),
                next.height_m
            );
        }
    }

    if let Some(extremes) = &data.extremes {
        if let Some(high) = &extremes.next_high {
            println!(
                "   Next high: {} ({:.2} m)",
                high.time.format("%Y-%m-%d %H:%M UTC"),
                high.height_m
            );
        }
        if let Some(low) = &extremes.next_low {
            println!(
                "   Next low:  {} ({:.2} m)",
                low.time.format("%Y-%m-%d %H:%M UTC"),
                low.height_m
            );
        }
    }

    if !data.predictions.is_empty() {
        println!("\n   Predictions ({}):", data.predictions.len());
        for prediction in &data.predictions {
            println!(
                "     {} {:>4} {:.2} m",
                prediction.time.format("%Y-%m-%d %H:%M"),
                format!("{:?}", prediction.kind),
                prediction.height_m
            );
        }
    }
}
