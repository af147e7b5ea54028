mod customer;
mod transaction;

pub use customer::{Customer, Wallet};
pub use transaction::{CreatePaymentTransaction, PaymentStatus, PaymentTransaction};
