use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{
    query_one, CUSTOMER_COLS, PAYMENT_TRANSACTION_COLS, WALLET_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Customers ============

/// Create a customer. Customers normally arrive from an external system;
/// this exists for dev seeding and tests.
pub fn create_customer(conn: &Connection, id: &str) -> Result<Customer> {
    let created_at = now();
    conn.execute(
        "INSERT INTO customers (id, wallet_balance, created_at) VALUES (?1, 0, ?2)",
        params![id, created_at],
    )?;
    Ok(Customer {
        id: id.to_string(),
        wallet_balance: 0,
        created_at,
    })
}

pub fn get_customer(conn: &Connection, id: &str) -> Result<Option<Customer>> {
    query_one(
        conn,
        &format!("SELECT {} FROM customers WHERE id = ?1", CUSTOMER_COLS),
        &[&id],
    )
}

pub fn customer_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM customers WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Increment the denormalized customer balance. Returns false if the
/// customer row does not exist.
pub fn credit_customer_balance(conn: &Connection, id: &str, amount: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE customers SET wallet_balance = wallet_balance + ?1 WHERE id = ?2",
        params![amount, id],
    )?;
    Ok(affected > 0)
}

// ============ Wallets ============

pub fn get_wallet(conn: &Connection, customer_id: &str) -> Result<Option<Wallet>> {
    query_one(
        conn,
        &format!("SELECT {} FROM wallets WHERE customer_id = ?1", WALLET_COLS),
        &[&customer_id],
    )
}

/// Increment the wallet balance if a wallet exists. Returns false when the
/// customer has no wallet yet.
pub fn credit_wallet(conn: &Connection, customer_id: &str, amount: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE wallets SET balance = balance + ?1, updated_at = ?2 WHERE customer_id = ?3",
        params![amount, now(), customer_id],
    )?;
    Ok(affected > 0)
}

/// Create a wallet seeded with the first credit.
pub fn create_wallet(conn: &Connection, customer_id: &str, balance: i64) -> Result<Wallet> {
    let id = gen_id();
    let updated_at = now();
    conn.execute(
        "INSERT INTO wallets (id, customer_id, balance, credit_limit, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![id, customer_id, balance, updated_at],
    )?;
    Ok(Wallet {
        id,
        customer_id: customer_id.to_string(),
        balance,
        credit_limit: 0,
        updated_at,
    })
}

// ============ Payment Transactions ============

pub fn payment_exists(conn: &Connection, payment_id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM payment_transactions WHERE payment_id = ?1",
            params![payment_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Insert the immutable ledger row. Fails with a constraint violation when
/// the payment was already recorded; callers decide whether that is a
/// duplicate (expected) or an error.
pub fn insert_payment_transaction(
    conn: &Connection,
    input: &CreatePaymentTransaction,
) -> std::result::Result<PaymentTransaction, rusqlite::Error> {
    let id = gen_id();
    let created_at = now();
    conn.execute(
        "INSERT INTO payment_transactions (id, payment_id, customer_id, amount, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            input.payment_id,
            input.customer_id,
            input.amount,
            input.status.as_str(),
            created_at
        ],
    )?;
    Ok(PaymentTransaction {
        id,
        payment_id: input.payment_id.clone(),
        customer_id: input.customer_id.clone(),
        amount: input.amount,
        status: input.status,
        created_at,
    })
}

pub fn get_payment_transaction(
    conn: &Connection,
    payment_id: &str,
) -> Result<Option<PaymentTransaction>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payment_transactions WHERE payment_id = ?1",
            PAYMENT_TRANSACTION_COLS
        ),
        &[&payment_id],
    )
}

pub fn count_payment_transactions(conn: &Connection, payment_id: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM payment_transactions WHERE payment_id = ?1",
        params![payment_id],
        |row| row.get(0),
    )?;
    Ok(count)
}
