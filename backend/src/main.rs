use std::{net::SocketAddr, sync::Arc};

use backend::{AppState, create_router, store::SpotStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_SPOTS_PATH: &str = "backend/data/sample_spots.json";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let spots_path = std::env::var("SPOTS_JSON").unwrap_or_else(|_| SAMPLE_SPOTS_PATH.to_string());
    let store = SpotStore::from_file(&spots_path).expect("load parking spot data");
    tracing::info!("loaded {} parking spots from {spots_path}", store.spot_count());

    let state = AppState {
        store: Arc::new(store),
    };
    let app = create_router(state);

    let addr: SocketAddr = "0.0.0.0:8080".parse().expect("valid socket address");
    tracing::info!("starting backend on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}
