mod from_row;
pub mod queries;
mod schema;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::dedup::EventCache;
use crate::forward::Forwarder;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared across request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Secret Razorpay signs inbound webhook bodies with.
    pub razorpay_webhook_secret: String,
    /// API key secret for checkout-callback verification.
    pub razorpay_key_secret: String,
    /// Advisory replay index; owned here, not module-global.
    pub event_cache: Arc<EventCache>,
    /// Downstream relay, absent when forwarding is not configured.
    pub forwarder: Option<Arc<Forwarder>>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
