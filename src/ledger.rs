//! Settlement ledger: applies a payment's wallet credit exactly once.
//!
//! Everything runs inside a single transaction so a failure at any step
//! leaves balances exactly as they were. The existence check up front is a
//! courtesy fast-path, not a lock - two concurrent requests for the same
//! payment can both pass it, and the UNIQUE constraint on
//! `payment_transactions.payment_id` resolves the race at commit time.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::CreatePaymentTransaction;

/// Result of attempting to settle one payment.
#[derive(Debug, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// Balance credited and ledger row written.
    Applied { new_balance: i64 },
    /// This payment was settled before (or lost the race to a concurrent
    /// request). Not an error.
    AlreadyApplied,
    /// The referenced customer does not exist. Fatal for this event; a
    /// resend cannot fix it.
    CustomerNotFound,
}

/// Credit `input.amount` rupees to the customer's wallet and record the
/// payment, atomically.
pub fn apply_payment(
    conn: &mut Connection,
    input: &CreatePaymentTransaction,
) -> Result<SettlementOutcome> {
    debug_assert!(input.amount >= 0, "settlement amounts are non-negative");

    let tx = conn.transaction()?;

    // Fast path: skip the balance work for a payment we already recorded.
    if queries::payment_exists(&tx, &input.payment_id)? {
        tx.commit()?;
        return Ok(SettlementOutcome::AlreadyApplied);
    }

    if !queries::customer_exists(&tx, &input.customer_id)? {
        // Dropping the transaction rolls back; nothing was written yet.
        return Ok(SettlementOutcome::CustomerNotFound);
    }

    queries::credit_customer_balance(&tx, &input.customer_id, input.amount)?;

    // The denormalized customer balance and the wallet row move together.
    if !queries::credit_wallet(&tx, &input.customer_id, input.amount)? {
        queries::create_wallet(&tx, &input.customer_id, input.amount)?;
    }

    let new_balance = queries::get_customer(&tx, &input.customer_id)?
        .map(|c| c.wallet_balance)
        .unwrap_or(input.amount);

    if let Err(e) = queries::insert_payment_transaction(&tx, input) {
        if is_duplicate_payment(&e) {
            // A concurrent request committed this payment between our
            // existence check and this insert. Roll back the balance
            // increments and treat it as already applied.
            drop(tx);
            return Ok(SettlementOutcome::AlreadyApplied);
        }
        return Err(AppError::Database(e));
    }

    tx.commit()?;

    Ok(SettlementOutcome::Applied { new_balance })
}

/// True when an insert failed specifically on the payment_id uniqueness
/// constraint. Any other constraint violation stays an error.
fn is_duplicate_payment(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg)) => {
            e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("payment_transactions.payment_id")
        }
        _ => false,
    }
}
