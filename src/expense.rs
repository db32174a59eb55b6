//! Expense entries: money spent, grouped by category for the overview breakdown.

use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, Label, RecordKind, ValidationError, money::validate_amount};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// How an expense was paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Paid in cash.
    Cash,
    /// Paid with a credit card.
    CreditCard,
    /// Paid with a debit card.
    DebitCard,
    /// Any other method, e.g. a bank transfer.
    #[default]
    Other,
}

impl PaymentMethod {
    /// The name used in the database and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::DebitCard => "debit-card",
            PaymentMethod::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "credit-card" => Ok(PaymentMethod::CreditCard),
            "debit-card" => Ok(PaymentMethod::DebitCard),
            "other" => Ok(PaymentMethod::Other),
            _ => Err(ValidationError::Unparsable {
                field: "payment method",
                value: s.to_owned(),
            }),
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for PaymentMethod {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentMethod {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Money that was spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The amount spent, never negative.
    pub amount: f64,
    /// What the money was spent on, e.g. "Rent" or "Food".
    pub category: Label,
    /// How the expense was paid.
    pub payment_method: PaymentMethod,
    /// When the money was spent.
    pub date: Date,
}

/// The fields for creating or replacing an expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    /// The amount spent.
    pub amount: f64,
    /// What the money was spent on.
    pub category: Label,
    /// How the expense was paid.
    pub payment_method: PaymentMethod,
    /// When the money was spent.
    pub date: Date,
}

impl NewExpense {
    /// Check the amount and normalise the expense for storage.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] if the amount is negative, not finite or too large, or the
    /// category is blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            category: self.category.validate()?,
            amount: validate_amount("amount", self.amount)?,
            ..self
        })
    }
}

/// Initialize the expense table.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount REAL NOT NULL CHECK (amount >= 0),
            category TEXT NOT NULL,
            payment_method TEXT NOT NULL DEFAULT 'other',
            date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_expense_category ON expense(category);",
    )?;

    Ok(())
}

/// Validate and insert an expense, returning it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the amount is negative, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let new_expense = new_expense.validate()?;

    let expense = connection
        .prepare(
            "INSERT INTO expense (amount, category, payment_method, date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, amount, category, payment_method, date",
        )?
        .query_row(
            (
                new_expense.amount,
                new_expense.category.as_ref(),
                new_expense.payment_method,
                new_expense.date,
            ),
            map_row,
        )?;

    tracing::info!(
        id = expense.id,
        amount = expense.amount,
        category = %expense.category,
        "created expense"
    );

    Ok(expense)
}

/// Retrieve a single expense by ID.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, payment_method, date FROM expense WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all expenses, oldest first.
pub fn get_all_expenses(connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, amount, category, payment_method, date FROM expense
             ORDER BY date ASC, id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of an existing expense.
///
/// # Errors
/// Returns [Error::Validation] for invalid fields or [Error::UpdateMissing] if no expense has
/// `id`.
pub fn update_expense(
    id: ExpenseId,
    new_expense: NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    let new_expense = new_expense.validate()?;

    let rows_affected = connection.execute(
        "UPDATE expense SET amount = ?1, category = ?2, payment_method = ?3, date = ?4
         WHERE id = ?5",
        (
            new_expense.amount,
            new_expense.category.as_ref(),
            new_expense.payment_method,
            new_expense.date,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(RecordKind::Expense));
    }

    tracing::info!(id, "updated expense");

    Ok(())
}

/// Delete an expense by ID. Returns an error if the expense doesn't exist.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing(RecordKind::Expense));
    }

    tracing::info!(id, "deleted expense");

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category: String = row.get(2)?;

    Ok(Expense {
        id: row.get(0)?,
        amount: row.get(1)?,
        category: Label::new_unchecked(&raw_category),
        payment_method: row.get(3)?,
        date: row.get(4)?,
    })
}


#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{Error, Label, RecordKind};

    use super::{
        NewExpense, PaymentMethod, create_expense, create_expense_table, delete_expense,
        get_all_expenses, get_expense, update_expense,
    };

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_expense_table(&connection).expect("Could not create expense table");
        connection
    }

    fn groceries(amount: f64) -> NewExpense {
        NewExpense {
            amount,
            category: Label::new_unchecked("Food"),
            payment_method: PaymentMethod::DebitCard,
            date: date!(2025 - 03 - 14),
        }
    }

    #[test]
    fn create_expense_succeeds() {
        let connection = get_test_db_connection();

        let expense = create_expense(groceries(85.4), &connection).expect("Could not create");

        assert!(expense.id > 0);
        assert_eq!(expense.amount, 85.4);
        assert_eq!(expense.payment_method, PaymentMethod::DebitCard);
        assert_eq!(get_expense(expense.id, &connection), Ok(expense));
    }

    #[test]
    fn create_expense_rejects_negative_amount_without_writing() {
        let connection = get_test_db_connection();

        let result = create_expense(groceries(-85.4), &connection);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(get_all_expenses(&connection), Ok(vec![]));
    }

    #[test]
    fn get_all_expenses_returns_every_expense() {
        let connection = get_test_db_connection();
        let first = create_expense(groceries(1.0), &connection).unwrap();
        let second = create_expense(groceries(2.0), &connection).unwrap();

        assert_eq!(get_all_expenses(&connection), Ok(vec![first, second]));
    }

    #[test]
    fn update_expense_replaces_fields() {
        let connection = get_test_db_connection();
        let expense = create_expense(groceries(10.0), &connection).unwrap();
        let replacement = NewExpense {
            amount: 1200.0,
            category: Label::new_unchecked("Rent"),
            payment_method: PaymentMethod::Other,
            date: date!(2025 - 04 - 01),
        };

        update_expense(expense.id, replacement.clone(), &connection).unwrap();

        let updated = get_expense(expense.id, &connection).unwrap();
        assert_eq!(updated.amount, replacement.amount);
        assert_eq!(updated.category, replacement.category);
        assert_eq!(updated.payment_method, replacement.payment_method);
        assert_eq!(updated.date, replacement.date);
    }

    #[test]
    fn update_expense_with_invalid_id_returns_error() {
        let connection = get_test_db_connection();

        let result = update_expense(42, groceries(1.0), &connection);

        assert_eq!(result, Err(Error::UpdateMissing(RecordKind::Expense)));
    }

    #[test]
    fn delete_expense_with_invalid_id_returns_error() {
        let connection = get_test_db_connection();

        let result = delete_expense(42, &connection);

        assert_eq!(result, Err(Error::DeleteMissing(RecordKind::Expense)));
    }

    #[test]
    fn delete_expense_succeeds() {
        let connection = get_test_db_connection();
        let expense = create_expense(groceries(1.0), &connection).unwrap();

        assert_eq!(delete_expense(expense.id, &connection), Ok(()));
        assert_eq!(get_expense(expense.id, &connection), Err(Error::NotFound));
    }
}
