//! One-off extra payments against a debt and the history of those payments.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    debt::core::{DebtId, get_debt},
    money::{from_cents, to_cents, validate_positive_amount},
};

/// Database identifier for a debt payment.
pub type DebtPaymentId = i64;

/// An extra payment that was applied to a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPayment {
    /// The ID of the payment.
    pub id: DebtPaymentId,
    /// The debt the payment was applied to.
    pub debt_id: DebtId,
    /// The amount the user paid.
    pub amount: f64,
    /// The part of the payment that reduced the principal. Less than `amount` when the payment
    /// was larger than what was owed.
    pub applied_amount: f64,
    /// The principal left after the payment.
    pub balance_after: f64,
    /// When the payment was made.
    pub date: Date,
}

/// Initialize the debt payment table.
///
/// Requires the debt table, since payments are deleted along with their debt.
pub fn create_debt_payment_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS debt_payment (
            id INTEGER PRIMARY KEY,
            debt_id INTEGER NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            applied_amount REAL NOT NULL CHECK (applied_amount >= 0),
            balance_after REAL NOT NULL CHECK (balance_after >= 0),
            date TEXT NOT NULL,
            FOREIGN KEY(debt_id) REFERENCES debt(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_debt_payment_debt_id ON debt_payment(debt_id);",
    )?;

    Ok(())
}

/// Pay `amount` off the principal of a debt and return the new principal.
///
/// The principal never goes below zero; any excess is discarded. The debt
/// update and the payment record are written in one SQL transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `amount` is not greater than zero,
/// - [Error::NotFound] if no debt has `debt_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn apply_extra_payment(
    debt_id: DebtId,
    amount: f64,
    date: Date,
    connection: &Connection,
) -> Result<f64, Error> {
    let amount = validate_positive_amount("extra payment", amount)?;

    let transaction = connection.unchecked_transaction()?;

    let debt = get_debt(debt_id, &transaction)?;
    let owed = to_cents(debt.principal);
    let applied = to_cents(amount).min(owed);
    let balance_after = from_cents(owed - applied);

    transaction.execute(
        "UPDATE debt SET principal = ?1 WHERE id = ?2",
        (balance_after, debt_id),
    )?;

    transaction.execute(
        "INSERT INTO debt_payment (debt_id, amount, applied_amount, balance_after, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (debt_id, amount, from_cents(applied), balance_after, date),
    )?;

    transaction.commit()?;

    tracing::info!(
        debt_id,
        amount,
        applied = from_cents(applied),
        balance_after,
        "applied extra payment"
    );

    Ok(balance_after)
}

/// Retrieve the payments made against a debt, oldest first.
///
/// # Errors
/// Returns [Error::NotFound] if no debt has `debt_id`.
pub fn get_debt_payments(
    debt_id: DebtId,
    connection: &Connection,
) -> Result<Vec<DebtPayment>, Error> {
    get_debt(debt_id, connection)?;

    connection
        .prepare(
            "SELECT id, debt_id, amount, applied_amount, balance_after, date
             FROM debt_payment WHERE debt_id = :debt_id
             ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":debt_id", &debt_id)], map_row)?
        .map(|maybe_payment| maybe_payment.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<DebtPayment, rusqlite::Error> {
    Ok(DebtPayment {
        id: row.get(0)?,
        debt_id: row.get(1)?,
        amount: row.get(2)?,
        applied_amount: row.get(3)?,
        balance_after: row.get(4)?,
        date: row.get(5)?,
    })
}
