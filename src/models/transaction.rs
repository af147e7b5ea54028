use serde::{Deserialize, Serialize};

/// Immutable ledger row - one per successfully applied payment event.
/// `payment_id` is unique across all time and anchors idempotency.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentTransaction {
    pub id: String,
    pub payment_id: String,
    pub customer_id: String,
    /// Whole rupees.
    pub amount: i64,
    pub status: PaymentStatus,
    pub created_at: i64,
}

/// Data required to record a settled payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentTransaction {
    pub payment_id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: PaymentStatus,
}

/// Processor payment states the ledger accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Authorized,
    Captured,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::Captured => "captured",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "authorized" => Some(Self::Authorized),
            "captured" => Some(Self::Captured),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
