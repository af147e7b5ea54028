//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const CUSTOMER_COLS: &str = "id, wallet_balance, created_at";

pub const WALLET_COLS: &str = "id, customer_id, balance, credit_limit, updated_at";

pub const PAYMENT_TRANSACTION_COLS: &str =
    "id, payment_id, customer_id, amount, status, created_at";

impl FromRow for Customer {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get(0)?,
            wallet_balance: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl FromRow for Wallet {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Wallet {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            balance: row.get(2)?,
            credit_limit: row.get(3)?,
            updated_at: row.get(4)?,
        })
    }
}

impl FromRow for PaymentTransaction {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get(4)?;
        Ok(PaymentTransaction {
            id: row.get(0)?,
            payment_id: row.get(1)?,
            customer_id: row.get(2)?,
            amount: row.get(3)?,
            status: PaymentStatus::from_str(&status).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(
                    4,
                    "status".to_string(),
                    rusqlite::types::Type::Text,
                )
            })?,
            created_at: row.get(5)?,
        })
    }
}
