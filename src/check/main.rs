//! Command-line address checks.
//!
//! Every subcommand prints JSON to stdout.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use domicilio::backend::{AddressBookClient, AddressPayload};
use domicilio::geocoding::{GeocodePolicy, GeocodingGateway, GoogleGeocoder};
use domicilio::models::StructuredAddress;
use domicilio::parser::AddressStringParser;
use domicilio::zones::DebouncedZoneValidator;
use domicilio::Config;

#[derive(Parser, Debug)]
#[command(name = "addrcheck")]
#[command(about = "Validate, parse and geocode delivery addresses")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Geocoding API key (overrides the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a postal code is deliverable
    Zone { code: String },

    /// Validate postal codes read from stdin, one per line, after typing pauses
    Watch,

    /// Parse a free-text address
    Parse { text: String },

    /// Normalize a locality name
    Locality { name: String },

    /// Geocode an address
    Geocode {
        address: String,

        /// Reject low-precision results instead of falling back
        #[arg(long)]
        strict: bool,
    },

    /// Reverse geocode a dropped pin
    Reverse {
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lon: f64,
    },

    /// Parse an address and save it to a user's address book
    Save {
        #[arg(long)]
        user: String,

        text: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        default: bool,

        /// Replace this saved address instead of creating a new one
        #[arg(long)]
        replace: Option<String>,
    },

    /// Delete a saved address
    Remove {
        #[arg(long)]
        user: String,

        id: String,
    },

    /// List a user's saved addresses
    List {
        #[arg(long)]
        user: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(api_key) = args.api_key {
        config.geocoding.api_key = api_key;
    }

    match args.command {
        Command::Zone { code } => {
            let zone = config.zone_validator()?;
            match zone.validate(&code) {
                Ok(entry) => print_json(&json!({ "deliverable": true, "zone": entry }))?,
                Err(e) => print_json(&json!({ "deliverable": false, "error": e.to_string() }))?,
            }
        }
        Command::Watch => watch(&config).await?,
        Command::Parse { text } => {
            let mapper = Arc::new(config.locality_mapper()?);
            let parser = AddressStringParser::new(mapper).context("Failed to compile parser")?;
            let address = parser.parse(&text);
            let conflict = parser.region_conflict(&StructuredAddress::from(address.clone()));
            print_json(&json!({
                "address": address,
                "unresolved": address.unresolved_fields(),
                "region_conflict": conflict,
            }))?;
        }
        Command::Locality { name } => {
            let mapper = config.locality_mapper()?;
            print_json(&mapper.map_locality(&name))?;
        }
        Command::Geocode { address, strict } => {
            let gateway = gateway(&config)?;
            let policy = GeocodePolicy { strict };
            print_json(&gateway.resolve_detailed(&address, policy).await)?;
        }
        Command::Reverse { lat, lon } => {
            let gateway = gateway(&config)?;
            print_json(&gateway.reverse_resolve(lat, lon).await)?;
        }
        Command::Save {
            user,
            text,
            phone,
            default,
            replace,
        } => {
            let mapper = Arc::new(config.locality_mapper()?);
            let parser = AddressStringParser::new(mapper).context("Failed to compile parser")?;
            let address = StructuredAddress::from(parser.parse(&text));
            let payload = AddressPayload::from_structured(&address, phone.as_deref(), default)?;

            let client = AddressBookClient::new(&config.backend.base_url)?;
            let record = match replace {
                Some(id) => client.update(&user, &id, &payload).await?,
                None => client.create(&user, &payload).await?,
            };
            print_json(&record)?;
        }
        Command::Remove { user, id } => {
            let client = AddressBookClient::new(&config.backend.base_url)?;
            client.delete(&user, &id).await?;
            print_json(&json!({ "deleted": id }))?;
        }
        Command::List { user } => {
            let client = AddressBookClient::new(&config.backend.base_url)?;
            print_json(&client.list(&user).await?)?;
        }
    }

    Ok(())
}

fn gateway(config: &Config) -> Result<GeocodingGateway<GoogleGeocoder>> {
    let mapper = Arc::new(config.locality_mapper()?);
    let provider = GoogleGeocoder::new(&config.geocoding)?;
    Ok(GeocodingGateway::new(
        provider,
        mapper,
        config.gateway_settings(),
    ))
}

/// Feeds stdin lines through the debouncer and prints each settled check.
async fn watch(config: &Config) -> Result<()> {
    let zone = Arc::new(config.zone_validator()?);
    let window = config.debounce_window();
    info!("Validating after {:?} of inactivity", window);

    let (validator, mut checks) = DebouncedZoneValidator::spawn(zone, window);

    let (line_tx, mut line_rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(check) = checks.recv().await {
            let value = match check.result {
                Ok(entry) => json!({ "code": check.code, "deliverable": true, "zone": entry }),
                Err(e) => json!({ "code": check.code, "deliverable": false, "error": e.to_string() }),
            };
            println!("{}", value);
        }
    });

    while let Some(line) = line_rx.recv().await {
        if !validator.submit(line.trim()) {
            break;
        }
    }
    validator.finish().await;
    printer.await.context("Printer task failed")?;
    Ok(())
}
