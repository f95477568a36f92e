//! Land Permit Assistant server
//!
//! Looks up Korean parcels by address and serves their land, price,
//! land-use and building registry data as one JSON contract. Provides REST
//! API endpoints for:
//!
//! - Address search with PNU derivation (juso)
//! - Land characteristics, assessed price and land use (VWorld)
//! - Building title and unit records (data.go.kr building registry)
//! - Permit application PDF rendering (Typst)
//!
//! ## Architecture
//!
//! Handlers delegate to [`service::ParcelService`], which issues sequential
//! calls through the [`upstream::Upstream`] seam and normalizes the answers
//! with `parcel-core`. PDF rendering uses `permit-pdf` on a blocking thread.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use parcel_core::UsageStrategy;
use permit_pdf::{FontCache, PermitRenderer, DEFAULT_RENDER_TIMEOUT_MS};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod error;
mod service;
mod upstream;

use config::{
    ApiKeys, AppConfig, Endpoints, DEFAULT_BUILDING_BASE_URL, DEFAULT_JUSO_BASE_URL,
    DEFAULT_VWORLD_BASE_URL, DEV_ADDRESS_API_KEY, DEV_BUILDING_API_KEY, DEV_VWORLD_API_KEY,
};
use service::ParcelService;
use upstream::HttpUpstream;

/// Command-line arguments for the permit server
#[derive(Parser, Debug)]
#[command(name = "permit-api")]
#[command(about = "Parcel lookup and land-transaction permit application server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// juso address search key
    #[arg(long, env = "ADDRESS_API_KEY", default_value = DEV_ADDRESS_API_KEY, hide_default_value = true)]
    address_api_key: String,

    /// VWorld key
    #[arg(long, env = "VWORLD_API_KEY", default_value = DEV_VWORLD_API_KEY, hide_default_value = true)]
    vworld_api_key: String,

    /// data.go.kr service key
    #[arg(long, env = "BUILDING_API_KEY", default_value = DEV_BUILDING_API_KEY, hide_default_value = true)]
    building_api_key: String,

    #[arg(long, env = "JUSO_BASE_URL", default_value = DEFAULT_JUSO_BASE_URL)]
    juso_base_url: String,

    #[arg(long, env = "VWORLD_BASE_URL", default_value = DEFAULT_VWORLD_BASE_URL)]
    vworld_base_url: String,

    #[arg(long, env = "BUILDING_BASE_URL", default_value = DEFAULT_BUILDING_BASE_URL)]
    building_base_url: String,

    /// Reference year for assessed land prices
    #[arg(long, env = "PRICE_REFERENCE_YEAR", default_value = parcel_core::DEFAULT_REFERENCE_YEAR)]
    price_year: String,

    /// Usage classification: "keyword" or "included-only"
    #[arg(long, env = "USAGE_STRATEGY", default_value = "keyword")]
    usage_strategy: UsageStrategy,

    /// Skip the VWorld land-share stage of unit lookups
    #[arg(long, env = "DISABLE_LAND_SHARE")]
    disable_land_share: bool,

    /// Korean font file, probed before the well-known locations
    #[arg(long, env = "KOREAN_FONT_PATH")]
    korean_font: Option<PathBuf>,

    /// Render timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_RENDER_TIMEOUT_MS)]
    render_timeout_ms: u64,

    /// Directory holding index.html and its assets
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn app_config(&self) -> AppConfig {
        AppConfig {
            keys: ApiKeys {
                address: self.address_api_key.clone(),
                vworld: self.vworld_api_key.clone(),
                building: self.building_api_key.clone(),
            },
            endpoints: Endpoints::new(
                &self.juso_base_url,
                &self.vworld_base_url,
                &self.building_base_url,
            ),
            price_year: self.price_year.clone(),
            usage_strategy: self.usage_strategy,
            land_share_enabled: !self.disable_land_share,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ParcelService>,
    pub renderer: Arc<PermitRenderer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting permit server on {}:{}", args.host, args.port);

    let config = args.app_config();
    if config.keys == ApiKeys::default() {
        warn!("Using development API keys; set ADDRESS_API_KEY, VWORLD_API_KEY and BUILDING_API_KEY");
    }

    let fonts = match FontCache::load(args.korean_font.as_deref()) {
        Ok(fonts) => fonts,
        Err(e) => {
            warn!("Font probing failed ({}), using embedded fonts", e);
            FontCache::embedded()
        }
    };
    let renderer = PermitRenderer::new(Arc::new(fonts), args.render_timeout_ms);

    let upstream = Arc::new(HttpUpstream::new(&config));
    info!(
        "Usage strategy: {}, land share: {}, price year: {}",
        config.usage_strategy,
        if config.land_share_enabled { "on" } else { "off" },
        config.price_year
    );

    // Create shared state
    let state = AppState {
        service: Arc::new(ParcelService::new(upstream, config)),
        renderer: Arc::new(renderer),
    };

    let app = api::router(state, &args.static_dir);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Render timeout: {}ms", args.render_timeout_ms);

    axum::serve(listener, app).await?;

    Ok(())
}
