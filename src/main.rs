use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use neighborhood_finder::attractions::{Attraction, AttractionPipeline};
use neighborhood_finder::config::{
    ServerSettings, Settings, DEFAULT_GEOCODER_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT,
};
use neighborhood_finder::geo::geocode::{DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT};
use neighborhood_finder::geo::SphericalDistance;
use neighborhood_finder::selection::{BestNeighborhoodResolver, Neighborhood, SelectionError};
use neighborhood_finder::server::{self, AppState};
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// hoodfinder: resolve a batch of attractions to the single best neighborhood.
///
/// The best neighborhood is the one most attractions fall in; ties go to the
/// tied neighborhood closest, in total, to the others.
///
/// Examples:
///   hoodfinder best candidates.json
///   hoodfinder attractions attractions.json
///   cat attractions.json | hoodfinder --offline attractions -
///   hoodfinder serve --port 8080
#[derive(Parser)]
#[command(name = "hoodfinder", version, about, long_about = None)]
struct Cli {
    /// Neighborhood polygon dataset (JSON). Defaults to ~/.hoodfinder/neighborhoods.json.
    #[arg(long, global = true, env = "HOODFINDER_DATASET")]
    dataset: Option<PathBuf>,

    /// Nominatim base URL used for geocoding addresses.
    #[arg(long, global = true, env = "HOODFINDER_NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL)]
    nominatim_url: String,

    /// Geocoder request timeout in seconds.
    #[arg(long, global = true, env = "HOODFINDER_GEOCODER_TIMEOUT_SECS", default_value_t = DEFAULT_GEOCODER_TIMEOUT_SECS)]
    geocoder_timeout_secs: u64,

    /// Offline mode: never geocode; only attractions with coordinates are placed.
    #[arg(long, global = true, env = "HOODFINDER_OFFLINE")]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the best neighborhood from a JSON array of neighborhoods.
    Best {
        /// Input file, or "-" for stdin.
        input: PathBuf,
    },
    /// Geocode and place a JSON array of attractions, then pick the best neighborhood.
    Attractions {
        /// Input file, or "-" for stdin.
        input: PathBuf,
    },
    /// List the dataset's neighborhoods with their centroids.
    Neighborhoods,
    /// Serve the HTTP API.
    Serve {
        #[arg(long, env = "HOODFINDER_HOST", default_value = DEFAULT_HOST)]
        host: String,

        #[arg(long, env = "HOODFINDER_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            dataset: self.dataset.clone().unwrap_or(defaults.dataset),
            nominatim_url: self.nominatim_url.clone(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            geocoder_timeout: Duration::from_secs(self.geocoder_timeout_secs),
            offline: self.offline,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neighborhood_finder=info,hoodfinder=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Best { input } => {
            let candidates: Vec<Neighborhood> = read_json(input)?;
            let resolver = BestNeighborhoodResolver::new(SphericalDistance::default());
            match resolver.resolve(&candidates) {
                Ok(resolution) => print_json(&resolution),
                Err(SelectionError::NoCandidates) => bail!("no best neighborhood: the candidate list is empty"),
                Err(e) => Err(e.into()),
            }
        }

        Command::Attractions { input } => {
            let attractions: Vec<Attraction> = read_json(input)?;
            let settings = cli.settings();
            settings.validate()?;
            let store = settings.load_store().context("loading neighborhood dataset")?;
            let geocoder = settings.geocoder();
            let distance = SphericalDistance::default();

            let pipeline = AttractionPipeline::new(geocoder.as_ref(), &store, &distance);
            let report = pipeline.run(attractions)?;
            print_json(&report)
        }

        Command::Neighborhoods => {
            let settings = cli.settings();
            settings.validate()?;
            let store = settings.load_store().context("loading neighborhood dataset")?;
            print_json(&store.neighborhoods())
        }

        Command::Serve { host, port } => {
            let settings = cli.settings();
            settings.validate()?;
            let server_settings = ServerSettings {
                host: host.clone(),
                port: *port,
            };
            server_settings.validate()?;

            let store = settings.load_store().context("loading neighborhood dataset")?;
            info!(neighborhoods = store.len(), dataset = %settings.dataset.display(), "dataset loaded");
            let state = AppState {
                store,
                geocoder: settings.geocoder(),
                distance: SphericalDistance::default(),
            };

            let addr = server_settings.addr();
            let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
            runtime
                .block_on(server::start(&addr, state))
                .with_context(|| format!("serving on {addr}"))
        }
    }
}

fn read_json<T: DeserializeOwned>(input: &Path) -> anyhow::Result<T> {
    let data = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };
    serde_json::from_str(&data).context("parsing input JSON")
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
