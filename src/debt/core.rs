use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Label, RecordKind, ValidationError,
    debt::repayment::{self, PayoffComparison, PayoffError, RepaymentProjection, ScheduleRow},
    money::{validate_amount, validate_rate},
};

/// Database identifier for a debt.
pub type DebtId = i64;

/// Money owed to a creditor, e.g. a credit card balance or a car loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    /// The id for the debt.
    pub id: DebtId,
    /// Who the money is owed to.
    pub name: Label,
    /// The outstanding principal, never negative.
    pub principal: f64,
    /// The annual interest rate as a percentage, e.g. `19.99`.
    pub annual_rate: f64,
    /// The smallest payment the creditor accepts each month.
    pub minimum_payment: f64,
}

impl Debt {
    /// Project the payoff of this debt when paying the minimum plus `extra_payment` each
    /// month.
    pub fn project(&self, extra_payment: f64) -> Result<RepaymentProjection, Error> {
        let payment = self.payment_with(extra_payment)?;

        repayment::project(self.principal, self.annual_rate, payment).map_err(Error::from)
    }

    /// The month-by-month schedule of [Debt::project].
    pub fn schedule(&self, extra_payment: f64) -> Result<Vec<ScheduleRow>, Error> {
        let payment = self.payment_with(extra_payment)?;

        repayment::schedule(self.principal, self.annual_rate, payment).map_err(Error::from)
    }

    /// Compare paying the minimum with paying the minimum plus `extra_payment`.
    pub fn compare(&self, extra_payment: f64) -> Result<PayoffComparison, Error> {
        repayment::compare(
            self.principal,
            self.annual_rate,
            self.minimum_payment,
            extra_payment,
        )
        .map_err(Error::from)
    }

    fn payment_with(&self, extra_payment: f64) -> Result<f64, PayoffError> {
        if !extra_payment.is_finite() || extra_payment < 0.0 {
            return Err(PayoffError::InvalidTerm("extra payment"));
        }

        Ok(self.minimum_payment + extra_payment)
    }
}

/// The fields for creating or replacing a debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebt {
    /// Who the money is owed to.
    pub name: Label,
    /// The amount owed.
    pub principal: f64,
    /// The annual interest rate as a percentage.
    pub annual_rate: f64,
    /// The minimum monthly payment.
    pub minimum_payment: f64,
}

impl NewDebt {
    /// Check the amounts and normalise the debt for storage.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] if any amount or the rate is out of range, or the name is
    /// blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.validate()?,
            principal: validate_amount("principal", self.principal)?,
            annual_rate: validate_rate("interest rate", self.annual_rate)?,
            minimum_payment: validate_amount("minimum payment", self.minimum_payment)?,
            ..self
        })
    }
}

/// Initialize the debt table.
pub fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            principal REAL NOT NULL CHECK (principal >= 0),
            annual_rate REAL NOT NULL CHECK (annual_rate >= 0),
            minimum_payment REAL NOT NULL CHECK (minimum_payment >= 0)
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_debt(row: &Row) -> Result<Debt, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let principal = row.get(2)?;
    let annual_rate = row.get(3)?;
    let minimum_payment = row.get(4)?;

    Ok(Debt {
        id,
        name: Label::new_unchecked(&raw_name),
        principal,
        annual_rate,
        minimum_payment,
    })
}

/// Validate and insert a debt, returning it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if an amount is negative, in which case nothing is written,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_debt(new_debt: NewDebt, connection: &Connection) -> Result<Debt, Error> {
    let new_debt = new_debt.validate()?;

    let debt = connection
        .prepare(
            "INSERT INTO debt (name, principal, annual_rate, minimum_payment)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, principal, annual_rate, minimum_payment",
        )?
        .query_row(
            (
                new_debt.name.as_ref(),
                new_debt.principal,
                new_debt.annual_rate,
                new_debt.minimum_payment,
            ),
            map_row_to_debt,
        )?;

    tracing::info!(id = debt.id, name = %debt.name, principal = debt.principal, "created debt");

    Ok(debt)
}

/// Retrieve a single debt by ID.
pub fn get_debt(id: DebtId, connection: &Connection) -> Result<Debt, Error> {
    connection
        .prepare(
            "SELECT id, name, principal, annual_rate, minimum_payment FROM debt WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_debt)
        .map_err(|error| error.into())
}

/// Retrieve all debts in the order they were added.
pub fn get_all_debts(connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare("SELECT id, name, principal, annual_rate, minimum_payment FROM debt ORDER BY id ASC")?
        .query_map([], map_row_to_debt)?
        .map(|maybe_debt| maybe_debt.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of an existing debt.
pub fn update_debt(id: DebtId, new_debt: NewDebt, connection: &Connection) -> Result<(), Error> {
    let new_debt = new_debt.validate()?;

    let rows_affected = connection.execute(
        "UPDATE debt SET name = ?1, principal = ?2, annual_rate = ?3, minimum_payment = ?4
         WHERE id = ?5",
        (
            new_debt.name.as_ref(),
            new_debt.principal,
            new_debt.annual_rate,
            new_debt.minimum_payment,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(RecordKind::Debt));
    }

    tracing::info!(id, "updated debt");

    Ok(())
}

/// Change the minimum monthly payment of a debt and return the amount stored, rounded to cents.
///
/// # Errors
/// Returns [Error::Validation] if the amount is negative or [Error::UpdateMissing] if no debt
/// has `id`.
pub fn set_minimum_payment(
    id: DebtId,
    minimum_payment: f64,
    connection: &Connection,
) -> Result<f64, Error> {
    let minimum_payment = validate_amount("minimum payment", minimum_payment)?;

    let rows_affected = connection.execute(
        "UPDATE debt SET minimum_payment = ?1 WHERE id = ?2",
        (minimum_payment, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(RecordKind::Debt));
    }

    tracing::info!(id, minimum_payment, "set minimum payment");

    Ok(minimum_payment)
}

/// Delete a debt and its payment history. Returns an error if the debt doesn't exist.
pub fn delete_debt(id: DebtId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM debt WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing(RecordKind::Debt));
    }

    tracing::info!(id, "deleted debt");

    Ok(())
}


#[cfg(test)]
mod debt_query_tests {
    use rusqlite::Connection;

    use crate::{Error, Label, PayoffError, RecordKind, ValidationError};

    use super::{
        NewDebt, create_debt, create_debt_table, delete_debt, get_all_debts, get_debt,
        set_minimum_payment, update_debt,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_debt_table(&conn).unwrap();
        conn
    }

    fn credit_card() -> NewDebt {
        NewDebt {
            name: Label::new_unchecked("Credit card"),
            principal: 1200.0,
            annual_rate: 12.0,
            minimum_payment: 107.0,
        }
    }

    #[test]
    fn create_debt_succeeds() {
        let conn = get_test_connection();

        let debt = create_debt(credit_card(), &conn).expect("Could not create debt");

        assert!(debt.id > 0);
        assert_eq!(debt.principal, 1200.0);
        assert_eq!(get_debt(debt.id, &conn), Ok(debt));
    }

    #[test]
    fn create_debt_rejects_negative_rate() {
        let conn = get_test_connection();

        let result = create_debt(
            NewDebt {
                annual_rate: -3.0,
                ..credit_card()
            },
            &conn,
        );

        assert_eq!(
            result,
            Err(Error::Validation(ValidationError::Negative("interest rate")))
        );
        assert_eq!(get_all_debts(&conn), Ok(vec![]));
    }

    #[test]
    fn get_debt_with_invalid_id_returns_not_found() {
        let conn = get_test_connection();

        assert_eq!(get_debt(1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn set_minimum_payment_changes_only_the_payment() {
        let conn = get_test_connection();
        let debt = create_debt(credit_card(), &conn).unwrap();

        set_minimum_payment(debt.id, 150.0, &conn).unwrap();

        let updated = get_debt(debt.id, &conn).unwrap();
        assert_eq!(updated.minimum_payment, 150.0);
        assert_eq!(updated.principal, debt.principal);
    }

    #[test]
    fn set_minimum_payment_rejects_negative_amount() {
        let conn = get_test_connection();
        let debt = create_debt(credit_card(), &conn).unwrap();

        let result = set_minimum_payment(debt.id, -1.0, &conn);

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(get_debt(debt.id, &conn), Ok(debt));
    }

    #[test]
    fn set_minimum_payment_on_missing_debt_returns_error() {
        let conn = get_test_connection();

        assert_eq!(
            set_minimum_payment(5, 10.0, &conn),
            Err(Error::UpdateMissing(RecordKind::Debt))
        );
    }

    #[test]
    fn update_debt_replaces_fields() {
        let conn = get_test_connection();
        let debt = create_debt(credit_card(), &conn).unwrap();
        let replacement = NewDebt {
            name: Label::new_unchecked("Car loan"),
            principal: 8000.0,
            annual_rate: 6.5,
            minimum_payment: 250.0,
        };

        update_debt(debt.id, replacement, &conn).unwrap();

        let updated = get_debt(debt.id, &conn).unwrap();
        assert_eq!(updated.name.as_ref(), "Car loan");
        assert_eq!(updated.annual_rate, 6.5);
    }

    #[test]
    fn delete_debt_with_invalid_id_returns_error() {
        let conn = get_test_connection();

        assert_eq!(
            delete_debt(9, &conn),
            Err(Error::DeleteMissing(RecordKind::Debt))
        );
    }

    #[test]
    fn stored_debt_projects_with_its_minimum_payment() {
        let conn = get_test_connection();
        let debt = create_debt(credit_card(), &conn).unwrap();

        let projection = debt.project(0.0).unwrap();

        assert_eq!(projection.months_to_payoff, 12);
        assert_eq!(projection.total_interest_paid, 79.16);
        assert_eq!(debt.project(50.0).unwrap().months_to_payoff, 8);
    }

    #[test]
    fn debt_without_minimum_payment_cannot_be_projected() {
        let conn = get_test_connection();
        let debt = create_debt(
            NewDebt {
                minimum_payment: 0.0,
                ..credit_card()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(
            debt.project(0.0),
            Err(Error::InvalidInput(PayoffError::NonPositivePayment))
        );
    }
}
