use serde::Serialize;

/// Wallet owner. Customers are provisioned by an external system; this
/// service only reads them and increments the denormalized balance.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    pub id: String,
    /// Denormalized copy of the wallet balance (whole rupees). Moves in the
    /// same transaction as `Wallet.balance`.
    pub wallet_balance: i64,
    pub created_at: i64,
}

/// One-to-one with a customer, created lazily on first credit.
#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    pub id: String,
    pub customer_id: String,
    /// Whole rupees.
    pub balance: i64,
    pub credit_limit: i64,
    pub updated_at: i64,
}
