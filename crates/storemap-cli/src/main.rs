mod filter;
mod output;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use storemap_catalog::{CatalogClient, CatalogSource};
use storemap_core::{
    navigation_url, AppConfig, FilterMode, MapProvider, Viewport, FOCUS_ZOOM,
    NEARBY_FOCUS_ZOOM,
};
use storemap_persist::{select_store, spawn_writer, StateStore, StorageConfig};
use storemap_session::{
    FixedGeolocator, GeolocationError, GeolocationOptions, StoreMapSession, StoreSearch,
};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use crate::filter::FilterCommands;
use crate::output::TerminalRenderer;
use crate::state::StateCommands;

#[derive(Debug, Parser)]
#[command(name = "storemap")]
#[command(about = "Store map filter, search and saved-view tool")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List stores visible under the current filters
    Stores,
    /// Show the region tree with store counts
    Regions {
        /// Tab whose type filter builds the tree (defaults to the active tab)
        #[arg(long, value_enum)]
        tab: Option<TabArg>,
    },
    /// Switch the active filter tab
    Tab {
        #[arg(value_enum)]
        tab: TabArg,
    },
    /// Change filter selections
    Filter {
        #[command(subcommand)]
        command: FilterCommands,
    },
    /// Turn marker clustering on or off
    Cluster {
        #[arg(value_enum, default_value = "toggle")]
        switch: Switch,
    },
    /// Search stores by name
    Search {
        query: String,
        #[command(flatten)]
        location: LocationArgs,
    },
    /// List the stores closest to a position
    Nearby {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Set the saved map center and zoom
    View {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
        zoom: u8,
    },
    /// Center the map on a store
    Focus {
        name: String,
        /// Use the nearby-list zoom level
        #[arg(long)]
        nearby: bool,
    },
    /// Print a turn-by-turn navigation link for a store
    Navigate {
        name: String,
        #[arg(long, value_enum, default_value = "google")]
        provider: ProviderArg,
    },
    /// Inspect or clear the saved state
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TabArg {
    Single,
    Multi,
}

impl From<TabArg> for FilterMode {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::Single => FilterMode::Single,
            TabArg::Multi => FilterMode::Multi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Switch {
    On,
    Off,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProviderArg {
    Google,
    Apple,
}

impl From<ProviderArg> for MapProvider {
    fn from(p: ProviderArg) -> Self {
        match p {
            ProviderArg::Google => MapProvider::Google,
            ProviderArg::Apple => MapProvider::Apple,
        }
    }
}

/// Where the user is. Without both coordinates the lookup fails as if
/// location access were unavailable.
#[derive(Debug, Clone, Copy, PartialEq, clap::Args)]
struct LocationArgs {
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lng: Option<f64>,
}

impl LocationArgs {
    fn geolocator(self) -> FixedGeolocator {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => FixedGeolocator::at(lat, lng),
            _ => FixedGeolocator::failing(GeolocationError::Unavailable),
        }
    }
}

/// One loaded catalog, its session and the writer persisting it.
struct App {
    session: StoreMapSession<TerminalRenderer>,
    store: Arc<dyn StateStore>,
    writer: JoinHandle<()>,
    discard_pending: bool,
}

impl App {
    async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let sources = CatalogSource::parse_all(&config.catalog_sources, &config.static_dir)?;
        let client = CatalogClient::new(config.fetch_timeout_secs, &config.user_agent)?;
        let catalog = client
            .load_catalog(&sources)
            .await
            .context("failed to load store catalog; check the network or the source paths")?;

        let store = select_store(&StorageConfig::from_app_config(config));
        let mut session = StoreMapSession::new(Arc::new(catalog), TerminalRenderer::default());
        session.start(store.as_ref());
        let writer = spawn_writer(
            Arc::clone(&store),
            session.subscribe(),
            Duration::from_millis(config.save_debounce_ms),
        );

        Ok(Self {
            session,
            store,
            writer,
            discard_pending: false,
        })
    }

    /// Exit without flushing, so a cleared store stays empty.
    fn discard_pending_writes(&mut self) {
        self.discard_pending = true;
    }

    /// Drop the session so the writer flushes, then wait for it.
    async fn close(self) -> anyhow::Result<()> {
        let Self {
            session,
            writer,
            discard_pending,
            ..
        } = self;
        if discard_pending {
            writer.abort();
            return Ok(());
        }
        drop(session);
        writer.await.context("state writer task failed")?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = storemap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("storemap ready; run `storemap --help` for commands");
        return Ok(());
    };

    let mut app = App::open(&config).await?;
    run(&mut app, &config, command, cli.json).await?;
    app.close().await
}

async fn run(
    app: &mut App,
    config: &AppConfig,
    command: Commands,
    json: bool,
) -> anyhow::Result<()> {
    let session = &mut app.session;
    match command {
        Commands::Stores => output::print_stores(&session.visible_stores(), json)?,
        Commands::Regions { tab } => {
            let mode = tab.map_or(session.selection().mode, FilterMode::from);
            output::print_regions(session, mode, json)?;
        }
        Commands::Tab { tab } => {
            session.set_mode(tab.into());
            output::print_stores(&session.visible_stores(), json)?;
        }
        Commands::Filter { command } => {
            filter::run_filter(session, command)?;
            output::print_stores(&session.visible_stores(), json)?;
        }
        Commands::Cluster { switch } => {
            let enabled = match switch {
                Switch::On => true,
                Switch::Off => false,
                Switch::Toggle => !session.selection().clustering,
            };
            session.set_clustering(enabled);
            println!("clustering {}", if enabled { "on" } else { "off" });
        }
        Commands::Search { query, location } => {
            let search = StoreSearch::new(
                session.shared_catalog(),
                location.geolocator(),
                GeolocationOptions::from_app_config(config),
            );
            let results = search.search(&query).await.unwrap_or_default();
            output::print_ranked(&results, json)?;
        }
        Commands::Nearby { location } => {
            let search = StoreSearch::new(
                session.shared_catalog(),
                location.geolocator(),
                GeolocationOptions::from_app_config(config),
            );
            match search.nearby().await {
                Some(Ok(nearby)) => {
                    output::print_ranked(&nearby.stores, json)?;
                    session.show_position(nearby.origin);
                }
                Some(Err(e)) => anyhow::bail!(
                    "{} Check that location services are on, or try again later.",
                    e.user_message()
                ),
                None => tracing::debug!("nearby lookup superseded"),
            }
        }
        Commands::View { lat, lng, zoom } => {
            session.set_viewport(Viewport::new(lat, lng, zoom));
            output::print_viewport(session.selection().viewport, json)?;
        }
        Commands::Focus { name, nearby } => {
            let zoom = if nearby { NEARBY_FOCUS_ZOOM } else { FOCUS_ZOOM };
            session.focus_store(&name, zoom)?;
            output::print_viewport(session.selection().viewport, json)?;
        }
        Commands::Navigate { name, provider } => {
            let store = session
                .catalog()
                .find_by_name(&name)
                .with_context(|| format!("no store named '{name}'"))?;
            println!("{}", navigation_url(&store.address, provider.into()));
        }
        Commands::State { command } => state::run_state(app, command, json)?,
    }
    Ok(())
}
