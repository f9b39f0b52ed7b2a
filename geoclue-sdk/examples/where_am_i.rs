//! Print the current location and optionally watch it change
//!
//! Run with: cargo run -p geoclue-sdk --example where_am_i -- --watch 30

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use geoclue_sdk::logging::{init_logging, LoggingMode};
use geoclue_sdk::{AccuracyLevel, GeoclueSystem, LocationConfig, ResourceFlags, SdkError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Accuracy {
    Country,
    Region,
    Locality,
    PostalCode,
    Street,
    Detailed,
}

impl From<Accuracy> for AccuracyLevel {
    fn from(value: Accuracy) -> Self {
        match value {
            Accuracy::Country => AccuracyLevel::Country,
            Accuracy::Region => AccuracyLevel::Region,
            Accuracy::Locality => AccuracyLevel::Locality,
            Accuracy::PostalCode => AccuracyLevel::PostalCode,
            Accuracy::Street => AccuracyLevel::Street,
            Accuracy::Detailed => AccuracyLevel::Detailed,
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Ask the Geoclue service where this machine is")]
struct Args {
    /// Directory of provider descriptor files
    #[arg(long)]
    providers: Option<PathBuf>,

    /// Accuracy to request
    #[arg(long, value_enum, default_value_t = Accuracy::Country)]
    accuracy: Accuracy,

    /// Allow GPS and cell resources as well as the network
    #[arg(long)]
    gps: bool,

    /// Bind position updates to this provider after initializing
    #[arg(long)]
    position_provider: Option<String>,

    /// Reverse geocode the current position
    #[arg(long)]
    reverse: bool,

    /// Keep printing changes for this many seconds
    #[arg(long, value_name = "SECONDS")]
    watch: Option<u64>,

    /// Print snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Log to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), SdkError> {
    let args = Args::parse();

    if args.verbose {
        if let Err(e) = init_logging(LoggingMode::Development) {
            eprintln!("Logging unavailable: {}", e);
        }
    }

    let mut config = LocationConfig::from_env()?.with_accuracy(args.accuracy.into());
    if let Some(path) = &args.providers {
        config = config.with_providers_path(path);
    }
    if args.gps {
        config = config.with_resources(ResourceFlags::ALL);
    }

    let system = GeoclueSystem::with_config(config.clone())?;

    println!("Installed providers:");
    for provider in system.get_available_providers() {
        println!(
            "  {:<20} address={} position={} geocode={} reverse={}",
            provider.name,
            provider.address,
            provider.position,
            provider.geocoding,
            provider.reverse_geocoding
        );
    }

    let json = args.json;
    system.connect(move |snapshot| {
        if json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Cannot encode snapshot: {}", e),
            }
        } else {
            println!(
                "[v{}] {:?} / {:?}",
                snapshot.version,
                snapshot.address.locality,
                snapshot.coordinates()
            );
        }
    });

    system.initialize(config.accuracy, config.resources)?;

    if let Ok(name) = system.get_address_provider() {
        println!("Address provider: {}", name);
    }
    if let Ok(name) = system.get_position_provider() {
        println!("Position provider: {}", name);
    }

    if let Some(name) = &args.position_provider {
        match system.set_position_provider(name) {
            Ok(()) => println!("Switched position provider to {}", name),
            Err(e) => println!("Could not switch to {}: {}", name, e),
        }
    }

    let location = system.get_location_info();
    if args.reverse {
        if let Some((lat, lon)) = location.coordinates() {
            match system.reverse_position(lat, lon, config.accuracy) {
                Some(address) => println!("Reverse geocoded: {:?}", address),
                None => println!("No reverse geocoding available"),
            }
        }
    }

    if let Some(seconds) = args.watch {
        println!("Watching for {} seconds...", seconds);
        thread::sleep(Duration::from_secs(seconds));
    }

    system.close();
    Ok(())
}
