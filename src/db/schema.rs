use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Customers (provisioned externally; this service reads and
        -- increments wallet_balance only)
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            wallet_balance INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        -- Wallets (one per customer, created lazily on first credit)
        CREATE TABLE IF NOT EXISTS wallets (
            id TEXT PRIMARY KEY,
            customer_id TEXT NOT NULL UNIQUE REFERENCES customers(id) ON DELETE CASCADE,
            balance INTEGER NOT NULL DEFAULT 0,
            credit_limit INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL
        );

        -- Settled payments. The UNIQUE constraint on payment_id is the
        -- durable idempotency anchor: a second insert of the same payment
        -- fails here regardless of arrival order or concurrency.
        CREATE TABLE IF NOT EXISTS payment_transactions (
            id TEXT PRIMARY KEY,
            payment_id TEXT NOT NULL UNIQUE,
            customer_id TEXT NOT NULL REFERENCES customers(id),
            amount INTEGER NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('authorized', 'captured')),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_payment_transactions_customer
            ON payment_transactions(customer_id);
        "#,
    )?;
    Ok(())
}
