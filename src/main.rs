use std::sync::Arc;

use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walletgate::config::Config;
use walletgate::db::{create_pool, init_db, queries, AppState};
use walletgate::dedup::EventCache;
use walletgate::forward::Forwarder;
use walletgate::handlers;

#[derive(Parser, Debug)]
#[command(name = "walletgate")]
#[command(about = "Idempotent Razorpay webhook gateway for wallet settlement")]
struct Cli {
    /// Seed the database with a demo customer (dev mode only)
    #[arg(long)]
    seed: bool,
}

/// Seeds a demo customer for local webhook testing. Customers are normally
/// provisioned by an external system.
fn seed_dev_customer(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seeding");

    const DEMO_CUSTOMER_ID: &str = "cust_demo";
    match queries::get_customer(&conn, DEMO_CUSTOMER_ID) {
        Ok(Some(_)) => {
            tracing::info!("Demo customer already exists, skipping seed");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Failed to check for demo customer: {}", e);
            return;
        }
    }

    let customer =
        queries::create_customer(&conn, DEMO_CUSTOMER_ID).expect("Failed to create demo customer");

    tracing::info!("============================================");
    tracing::info!("DEMO CUSTOMER CREATED");
    tracing::info!("Customer ID: {}", customer.id);
    tracing::info!("Put this ID in your order notes as customerId");
    tracing::info!("============================================");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "walletgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let forwarder = config
        .forward
        .as_ref()
        .map(|f| Arc::new(Forwarder::new(f.url.clone(), f.secret.clone())));

    match &config.forward {
        Some(f) => tracing::info!("Forwarding settled payments to {}", f.url),
        None => tracing::info!("Downstream forwarding disabled (FORWARD_URL not set)"),
    }

    let state = AppState {
        db: db_pool,
        razorpay_webhook_secret: config.razorpay_webhook_secret.clone(),
        razorpay_key_secret: config.razorpay_key_secret.clone(),
        event_cache: Arc::new(EventCache::new(config.event_cache_capacity)),
        forwarder,
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set WALLETGATE_ENV=dev)");
        } else {
            seed_dev_customer(&state);
        }
    }

    let app = handlers::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("walletgate listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
