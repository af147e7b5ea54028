use std::env;

/// Downstream forwarding target. Forwarding runs under its own secret so the
/// internal trust domain never shares key material with Razorpay.
#[derive(Debug, Clone)]
pub struct ForwardConfig {
    pub url: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Shared secret Razorpay signs webhook bodies with.
    pub razorpay_webhook_secret: String,
    /// API key secret, used to verify checkout-callback signatures.
    pub razorpay_key_secret: String,
    pub forward: Option<ForwardConfig>,
    pub event_cache_capacity: usize,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("WALLETGATE_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        // No fallback chain for the internal secret: forwarding stays
        // disabled unless both the URL and its own secret are configured.
        let forward = match env::var("FORWARD_URL") {
            Ok(url) => {
                let secret = env::var("INTERNAL_WEBHOOK_SECRET").expect(
                    "INTERNAL_WEBHOOK_SECRET is required when FORWARD_URL is set",
                );
                Some(ForwardConfig { url, secret })
            }
            Err(_) => None,
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "walletgate.db".to_string()),
            razorpay_webhook_secret: env::var("RAZORPAY_WEBHOOK_SECRET")
                .expect("RAZORPAY_WEBHOOK_SECRET is required"),
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET")
                .expect("RAZORPAY_KEY_SECRET is required"),
            forward,
            event_cache_capacity: env::var("EVENT_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
