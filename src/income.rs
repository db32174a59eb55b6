//! Income entries: money earned, e.g. a salary payment or a freelance invoice.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, Label, RecordKind, ValidationError, money::validate_amount};

/// Database identifier for an income entry.
pub type IncomeId = i64;

/// Money that was earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// The ID of the income entry.
    pub id: IncomeId,
    /// Where the money came from, e.g. the employer. May be empty.
    pub source: String,
    /// The amount earned, never negative.
    pub amount: f64,
    /// The category the income belongs to, e.g. "Salary" or "Freelance".
    pub category: Label,
    /// When the income was received.
    pub date: Date,
}

/// The fields for creating or replacing an income entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncome {
    /// Where the money came from.
    pub source: String,
    /// The amount earned.
    pub amount: f64,
    /// The category of the income.
    pub category: Label,
    /// When the income was received.
    pub date: Date,
}

impl NewIncome {
    /// Check the amount and normalise the entry for storage.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] if the amount is negative, not finite or too large, or the
    /// category is blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            category: self.category.validate()?,
            source: self.source.trim().to_owned(),
            amount: validate_amount("amount", self.amount)?,
            ..self
        })
    }
}

/// Initialize the income table.
pub fn create_income_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS income (
            id INTEGER PRIMARY KEY,
            source TEXT NOT NULL DEFAULT '',
            amount REAL NOT NULL CHECK (amount >= 0),
            category TEXT NOT NULL,
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_income_category ON income(category);",
    )?;

    Ok(())
}

/// Validate and insert an income entry, returning it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the amount is negative, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_income(new_income: NewIncome, connection: &Connection) -> Result<Income, Error> {
    let new_income = new_income.validate()?;

    let income = connection
        .prepare(
            "INSERT INTO income (source, amount, category, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, source, amount, category, date",
        )?
        .query_row(
            (
                &new_income.source,
                new_income.amount,
                new_income.category.as_ref(),
                new_income.date,
            ),
            map_row,
        )?;

    tracing::info!(id = income.id, amount = income.amount, "created income");

    Ok(income)
}

/// Retrieve a single income entry by ID.
pub fn get_income(id: IncomeId, connection: &Connection) -> Result<Income, Error> {
    connection
        .prepare("SELECT id, source, amount, category, date FROM income WHERE id = :id")?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all income entries, oldest first.
pub fn get_all_income(connection: &Connection) -> Result<Vec<Income>, Error> {
    connection
        .prepare("SELECT id, source, amount, category, date FROM income ORDER BY date ASC, id ASC")?
        .query_map([], map_row)?
        .map(|maybe_income| maybe_income.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of an existing income entry.
///
/// # Errors
/// Returns [Error::Validation] for invalid fields or [Error::UpdateMissing] if no entry has `id`.
pub fn update_income(
    id: IncomeId,
    new_income: NewIncome,
    connection: &Connection,
) -> Result<(), Error> {
    let new_income = new_income.validate()?;

    let rows_affected = connection.execute(
        "UPDATE income SET source = ?1, amount = ?2, category = ?3, date = ?4 WHERE id = ?5",
        (
            &new_income.source,
            new_income.amount,
            new_income.category.as_ref(),
            new_income.date,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(RecordKind::Income));
    }

    tracing::info!(id, "updated income");

    Ok(())
}

/// Delete an income entry by ID. Returns an error if the entry doesn't exist.
pub fn delete_income(id: IncomeId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM income WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing(RecordKind::Income));
    }

    tracing::info!(id, "deleted income");

    Ok(())
}

fn map_row(row: &Row) -> Result<Income, rusqlite::Error> {
    let raw_category: String = row.get(3)?;

    Ok(Income {
        id: row.get(0)?,
        source: row.get(1)?,
        amount: row.get(2)?,
        category: Label::new_unchecked(&raw_category),
        date: row.get(4)?,
    })
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_income_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_income_table(&connection));
    }
}
