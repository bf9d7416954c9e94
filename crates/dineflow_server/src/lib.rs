//! HTTP surface for DineFlow.
//!
//! Restaurants and menus are administered here, customers quote and place
//! orders, and the kitchen board lists and advances them. All rules live in
//! `dineflow_core`; handlers only translate JSON and status codes.
//!
//! # Environment
//! - `DINEFLOW_PORT`: listen port, default `8080`
//! - `DINEFLOW_DB_PATH`: SQLite file, default `dineflow.sqlite3`
//! - `DINEFLOW_TAX_BPS`: tax rate in basis points
//! - `DINEFLOW_DELIVERY_FEE`: delivery fee in cents
//! - `RUST_LOG`: tracing filter, e.g. `dineflow_server=debug`
use std::time::Duration;

use axum::{
    Router,
    http::{
        Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    routing::{get, patch, post, put},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use config::Config;
use error::StartupError;
use routes::{
    add_item_handler, browse_menu_handler, cancel_order_handler, category_offers_handler,
    create_menu_handler, create_offer_handler, create_restaurant_handler, delete_item_handler,
    get_menu_handler, get_order_handler, get_restaurant_handler, item_offers_handler,
    list_orders_handler, list_restaurants_handler, place_order_handler, quote_handler,
    set_offer_active_handler, set_restaurant_open_handler, update_item_handler,
    update_status_handler,
};
use state::AppState;

/// Builds the router over `state`.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/restaurants",
            post(create_restaurant_handler).get(list_restaurants_handler),
        )
        .route("/restaurants/{id}", get(get_restaurant_handler))
        .route("/restaurants/{id}/open", patch(set_restaurant_open_handler))
        .route("/menus", post(create_menu_handler))
        .route("/menus/restaurant/{restaurant_id}", get(get_menu_handler))
        .route(
            "/menus/restaurant/{restaurant_id}/items",
            get(browse_menu_handler),
        )
        .route("/menus/{menu_id}/items", post(add_item_handler))
        .route(
            "/menus/{menu_id}/items/{item_id}",
            put(update_item_handler).delete(delete_item_handler),
        )
        .route("/offers", post(create_offer_handler))
        .route("/offers/{offer_id}", patch(set_offer_active_handler))
        .route("/offers/item/{item_id}", get(item_offers_handler))
        .route("/offers/category/{category_id}", get(category_offers_handler))
        .route("/orders", post(place_order_handler).get(list_orders_handler))
        .route("/orders/quote", post(quote_handler))
        .route("/orders/{order_id}", get(get_order_handler))
        .route("/orders/{order_id}/status", patch(update_status_handler))
        .route("/orders/{order_id}/cancel", patch(cancel_order_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<(), StartupError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Opening database at {}", config.db_path.display());
    let state = AppState::open(&config)?;

    let address = format!("0.0.0.0:{}", config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                warn!("Failed to install Ctrl+C handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                warn!("Failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
