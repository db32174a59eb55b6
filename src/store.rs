//! The store: the single owner of the database connection.
//!
//! A [Store] is opened once at start up and passed to whatever needs it.
//! Each method maps to one user action and runs to completion before
//! returning.

use std::path::Path;

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    dashboard::{self, Breakdown, Overview, Summary},
    db,
    debt::{self, DebtId, DebtPayment, PayoffComparison, RepaymentProjection, ScheduleRow},
    expense, income,
    record::{NewRecord, Record, RecordId, RecordKind},
    savings::{self, SavingsGoalId, SavingsProgress},
};

/// Owns the connection to the application's SQLite database.
#[derive(Debug)]
pub struct Store {
    connection: Connection,
}

impl Store {
    /// Open (or create) the database at `path` and make sure its tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::debug!(?path, "opening database");

        Self::from_connection(Connection::open(path)?)
    }

    /// Open a database that lives only as long as the store.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Take ownership of `connection` and make sure its tables exist.
    pub fn from_connection(connection: Connection) -> Result<Self, Error> {
        db::initialize(&connection)?;

        Ok(Self { connection })
    }

    /// The underlying connection, for queries not covered by the store's methods.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Validate and insert a record, returning its ID.
    ///
    /// # Errors
    /// Returns [Error::Validation] without writing anything if a field is invalid.
    pub fn create(&self, record: NewRecord) -> Result<RecordId, Error> {
        let connection = &self.connection;

        let id = match record {
            NewRecord::Income(new_income) => income::create_income(new_income, connection)?.id,
            NewRecord::Expense(new_expense) => {
                expense::create_expense(new_expense, connection)?.id
            }
            NewRecord::Savings(new_goal) => savings::create_savings_goal(new_goal, connection)?.id,
            NewRecord::Debt(new_debt) => debt::create_debt(new_debt, connection)?.id,
        };

        Ok(id)
    }

    /// Retrieve a single record.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no record of `kind` with `id`.
    pub fn get(&self, kind: RecordKind, id: RecordId) -> Result<Record, Error> {
        let connection = &self.connection;

        let record = match kind {
            RecordKind::Income => Record::Income(income::get_income(id, connection)?),
            RecordKind::Expense => Record::Expense(expense::get_expense(id, connection)?),
            RecordKind::Savings => Record::Savings(savings::get_savings_goal(id, connection)?),
            RecordKind::Debt => Record::Debt(debt::get_debt(id, connection)?),
        };

        Ok(record)
    }

    /// Retrieve every record of `kind`.
    pub fn list(&self, kind: RecordKind) -> Result<Vec<Record>, Error> {
        let connection = &self.connection;

        let records = match kind {
            RecordKind::Income => income::get_all_income(connection)?
                .into_iter()
                .map(Record::Income)
                .collect(),
            RecordKind::Expense => expense::get_all_expenses(connection)?
                .into_iter()
                .map(Record::Expense)
                .collect(),
            RecordKind::Savings => savings::get_all_savings_goals(connection)?
                .into_iter()
                .map(Record::Savings)
                .collect(),
            RecordKind::Debt => debt::get_all_debts(connection)?
                .into_iter()
                .map(Record::Debt)
                .collect(),
        };

        Ok(records)
    }

    /// Replace the fields of the record with `id`. The kind is taken from `record`.
    ///
    /// # Errors
    /// Returns [Error::Validation] for invalid fields or [Error::UpdateMissing] if there is no
    /// such record. Neither writes anything.
    pub fn update(&self, id: RecordId, record: NewRecord) -> Result<(), Error> {
        let connection = &self.connection;

        match record {
            NewRecord::Income(new_income) => income::update_income(id, new_income, connection),
            NewRecord::Expense(new_expense) => {
                expense::update_expense(id, new_expense, connection)
            }
            NewRecord::Savings(new_goal) => savings::update_savings_goal(id, new_goal, connection),
            NewRecord::Debt(new_debt) => debt::update_debt(id, new_debt, connection),
        }
    }

    /// Delete the record of `kind` with `id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissing] if there is no such record.
    pub fn delete(&self, kind: RecordKind, id: RecordId) -> Result<(), Error> {
        let connection = &self.connection;

        match kind {
            RecordKind::Income => income::delete_income(id, connection),
            RecordKind::Expense => expense::delete_expense(id, connection),
            RecordKind::Savings => savings::delete_savings_goal(id, connection),
            RecordKind::Debt => debt::delete_debt(id, connection),
        }
    }

    /// Delete every record of every kind, atomically.
    pub fn reset(&self) -> Result<(), Error> {
        db::reset(&self.connection)
    }

    /// Clear the whole store. This cannot be undone.
    pub fn reset_all(&self) -> Result<(), Error> {
        self.reset()
    }

    /// The dashboard totals, computed from the current records.
    pub fn summary(&self) -> Result<Summary, Error> {
        dashboard::get_summary(&self.connection)
    }

    /// The summary plus the balance left after savings and debt.
    pub fn overview(&self) -> Result<Overview, Error> {
        dashboard::get_overview(&self.connection)
    }

    /// Expenses summed by category, in ascending order of category.
    pub fn category_breakdown(&self) -> Result<Breakdown, Error> {
        dashboard::get_expense_breakdown(&self.connection)
    }

    /// Income summed by category, in ascending order of category.
    pub fn income_breakdown(&self) -> Result<Breakdown, Error> {
        dashboard::get_income_breakdown(&self.connection)
    }

    /// Add to the amount saved towards a goal and return the new total.
    pub fn add_contribution(&self, goal_id: SavingsGoalId, amount: f64) -> Result<f64, Error> {
        savings::add_contribution(goal_id, amount, &self.connection)
    }

    /// Change the minimum monthly payment of a debt and return the amount stored.
    pub fn set_minimum_payment(&self, debt_id: DebtId, amount: f64) -> Result<f64, Error> {
        debt::set_minimum_payment(debt_id, amount, &self.connection)
    }

    /// Pay `amount` off a debt on `date` and return the principal still owed.
    pub fn apply_extra_payment(
        &self,
        debt_id: DebtId,
        amount: f64,
        date: Date,
    ) -> Result<f64, Error> {
        debt::apply_extra_payment(debt_id, amount, date, &self.connection)
    }

    /// How far a savings goal is from its target.
    pub fn savings_progress(&self, goal_id: SavingsGoalId) -> Result<SavingsProgress, Error> {
        Ok(savings::get_savings_goal(goal_id, &self.connection)?.progress())
    }

    /// The extra payments made against a debt, oldest first.
    pub fn list_debt_payments(&self, debt_id: DebtId) -> Result<Vec<DebtPayment>, Error> {
        debt::get_debt_payments(debt_id, &self.connection)
    }

    /// Project the payoff of a stored debt paying its minimum plus `extra_payment` a month.
    pub fn project_debt(
        &self,
        debt_id: DebtId,
        extra_payment: f64,
    ) -> Result<RepaymentProjection, Error> {
        debt::get_debt(debt_id, &self.connection)?.project(extra_payment)
    }

    /// The month-by-month repayment schedule of a stored debt.
    pub fn debt_schedule(
        &self,
        debt_id: DebtId,
        extra_payment: f64,
    ) -> Result<Vec<ScheduleRow>, Error> {
        debt::get_debt(debt_id, &self.connection)?.schedule(extra_payment)
    }

    /// Compare paying a stored debt's minimum with paying an extra amount on top.
    pub fn compare_debt_payoff(
        &self,
        debt_id: DebtId,
        extra_payment: f64,
    ) -> Result<PayoffComparison, Error> {
        debt::get_debt(debt_id, &self.connection)?.compare(extra_payment)
    }
}
