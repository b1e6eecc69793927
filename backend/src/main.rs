use axum::{routing::{get, post}, Router};
use std::net::SocketAddr;
use std::sync::Arc;

mod config;
mod error;
mod flow;
mod format;
mod handlers;
mod listing;
mod models;
mod property;
mod purchase;
mod storage;
mod store;
mod wallet;

use listing::ListingFlow;
use purchase::PurchaseFlow;
use store::ListingStore;
use wallet::{JsonRpcProvider, Provider, WalletSession};

#[derive(Clone)]
pub struct AppState {
    config: config::AppConfig,
    store: Arc<ListingStore>,
    wallet: Arc<WalletSession>,
    listings: Arc<ListingFlow>,
    purchases: Arc<PurchaseFlow>,
}

impl AppState {
    fn new(
        config: config::AppConfig,
        storage: Arc<dyn storage::LocalStorage>,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        let store = Arc::new(ListingStore::new(storage, config.storage_key.clone()));
        let wallet = Arc::new(WalletSession::new(provider));
        Self {
            listings: Arc::new(ListingFlow::new(store.clone(), wallet.clone())),
            purchases: Arc::new(PurchaseFlow::new(store.clone(), wallet.clone())),
            config,
            store,
            wallet,
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(property::catalog))
        .route("/properties", get(property::get_properties).post(handlers::create_property))
        .route("/properties/:id", get(property::get_property))
        .route("/properties/:id/buy", post(handlers::buy_shares))
        .route("/wallet", get(handlers::get_wallet))
        .route("/wallet/connect", post(handlers::connect_wallet))
        .route("/wallet/disconnect", post(handlers::disconnect_wallet))
        .route("/status", get(handlers::flow_status))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    log::info!("Loaded config: {:?}", config);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let provider: Option<Arc<dyn Provider>> = match &config.wallet_rpc_url {
        Some(url) => {
            let rpc = JsonRpcProvider::new(url.clone(), config.wallet_chain_id.clone());
            log::info!("Wallet provider at {}", rpc.url());
            let provider: Arc<dyn Provider> = Arc::new(rpc);
            Some(provider)
        }
        None => {
            log::warn!("WALLET_RPC_URL not set; wallet features are unavailable");
            None
        }
    };

    let storage = Arc::new(storage::FileStorage::new(&config.storage_dir));
    let state = AppState::new(config, storage, provider);
    let count = state.store.load().await?.len();
    log::info!(
        "{} properties available under key {}",
        count,
        state.config.storage_key
    );

    log::info!("Starting server on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app(state).into_make_service()).await?;

    Ok(())
}
