//! Creating and clearing the application's database.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    debt::{create_debt_payment_table, create_debt_table},
    expense::create_expense_table,
    income::create_income_table,
    savings::create_savings_goal_table,
};

/// The tables cleared by [reset], children before parents.
const TABLES: [&str; 5] = [
    "debt_payment",
    "debt",
    "savings_goal",
    "expense",
    "income",
];

/// Create the tables for the application's database if they do not exist yet.
///
/// Also turns on foreign key enforcement for `connection`, which SQLite leaves
/// off by default.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_income_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_savings_goal_table(&transaction)?;
    create_debt_table(&transaction)?;
    create_debt_payment_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Delete every record of every kind.
///
/// All tables are cleared in a single transaction, so either everything is
/// removed or nothing is. Resetting an empty database succeeds.
pub fn reset(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    for table in TABLES {
        let rows_deleted = transaction.execute(&format!("DELETE FROM {table}"), ())?;
        tracing::debug!(table, rows_deleted, "cleared table");
    }

    transaction.commit()?;

    tracing::info!("reset all records");

    Ok(())
}
