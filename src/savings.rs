//! Savings goals and the contributions made towards them.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, Label, RecordKind, ValidationError,
    money::{round_to_cents, validate_amount, validate_positive_amount},
};

/// Database identifier for a savings goal.
pub type SavingsGoalId = i64;

/// Money put aside towards a target, e.g. an emergency fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    /// The ID of the goal.
    pub id: SavingsGoalId,
    /// What the savings are for.
    pub name: Label,
    /// The amount the user wants to reach. Zero means no target has been set.
    pub target_amount: f64,
    /// The running total saved so far.
    pub saved_amount: f64,
    /// How much the user plans to contribute each month.
    pub monthly_contribution: f64,
    /// When the goal was created.
    pub date: Date,
}

/// The fields for creating or replacing a savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavingsGoal {
    /// What the savings are for.
    pub name: Label,
    /// The amount the user wants to reach.
    pub target_amount: f64,
    /// The amount already saved.
    pub saved_amount: f64,
    /// How much the user plans to contribute each month.
    pub monthly_contribution: f64,
    /// When the goal was created.
    pub date: Date,
}

impl NewSavingsGoal {
    /// Check the amounts and normalise the goal for storage.
    ///
    /// # Errors
    ///
    /// Returns a [ValidationError] if any amount is negative, not finite or too large, or the
    /// name is blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self.name.validate()?,
            target_amount: validate_amount("target amount", self.target_amount)?,
            saved_amount: validate_amount("saved amount", self.saved_amount)?,
            monthly_contribution: validate_amount(
                "monthly contribution",
                self.monthly_contribution,
            )?,
            ..self
        })
    }
}

/// How far a goal is from its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsProgress {
    /// What is left to save, never below zero.
    pub remaining: f64,
    /// Months needed to close the gap at the planned monthly contribution.
    ///
    /// `None` when there is no target or no planned contribution.
    pub months_to_goal: Option<f64>,
}

impl SavingsGoal {
    /// Work out how far this goal is from its target.
    pub fn progress(&self) -> SavingsProgress {
        let remaining = round_to_cents((self.target_amount - self.saved_amount).max(0.0));

        let months_to_goal = if self.target_amount > 0.0 && self.monthly_contribution > 0.0 {
            Some(remaining / self.monthly_contribution)
        } else {
            None
        };

        SavingsProgress {
            remaining,
            months_to_goal,
        }
    }
}

/// Initialize the savings goal table.
pub fn create_savings_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS savings_goal (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL DEFAULT 0 CHECK (target_amount >= 0),
            saved_amount REAL NOT NULL DEFAULT 0 CHECK (saved_amount >= 0),
            monthly_contribution REAL NOT NULL DEFAULT 0 CHECK (monthly_contribution >= 0),
            date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Validate and insert a savings goal, returning it with its generated ID.
pub fn create_savings_goal(
    new_goal: NewSavingsGoal,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let new_goal = new_goal.validate()?;

    let goal = connection
        .prepare(
            "INSERT INTO savings_goal (name, target_amount, saved_amount, monthly_contribution, date)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, target_amount, saved_amount, monthly_contribution, date",
        )?
        .query_row(
            (
                new_goal.name.as_ref(),
                new_goal.target_amount,
                new_goal.saved_amount,
                new_goal.monthly_contribution,
                new_goal.date,
            ),
            map_row,
        )?;

    tracing::info!(id = goal.id, name = %goal.name, "created savings goal");

    Ok(goal)
}

/// Retrieve a single savings goal by ID.
pub fn get_savings_goal(id: SavingsGoalId, connection: &Connection) -> Result<SavingsGoal, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, saved_amount, monthly_contribution, date
             FROM savings_goal WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all savings goals, oldest first.
pub fn get_all_savings_goals(connection: &Connection) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(
            "SELECT id, name, target_amount, saved_amount, monthly_contribution, date
             FROM savings_goal ORDER BY date ASC, id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Replace every field of an existing savings goal, including the saved amount.
pub fn update_savings_goal(
    id: SavingsGoalId,
    new_goal: NewSavingsGoal,
    connection: &Connection,
) -> Result<(), Error> {
    let new_goal = new_goal.validate()?;

    let rows_affected = connection.execute(
        "UPDATE savings_goal
         SET name = ?1, target_amount = ?2, saved_amount = ?3, monthly_contribution = ?4, date = ?5
         WHERE id = ?6",
        (
            new_goal.name.as_ref(),
            new_goal.target_amount,
            new_goal.saved_amount,
            new_goal.monthly_contribution,
            new_goal.date,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissing(RecordKind::Savings));
    }

    tracing::info!(id, "updated savings goal");

    Ok(())
}

/// Add `amount` to the running total of a savings goal and return the new total.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if `amount` is not greater than zero or the new total would be too
///   large to store,
/// - [Error::UpdateMissing] if no goal has `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn add_contribution(
    id: SavingsGoalId,
    amount: f64,
    connection: &Connection,
) -> Result<f64, Error> {
    let amount = validate_positive_amount("contribution", amount)?;

    let transaction = connection.unchecked_transaction()?;

    let saved: f64 = transaction
        .query_row(
            "SELECT saved_amount FROM savings_goal WHERE id = ?1",
            [id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::UpdateMissing(RecordKind::Savings))?;

    let saved = validate_amount("saved amount", round_to_cents(saved + amount))?;

    transaction.execute(
        "UPDATE savings_goal SET saved_amount = ?1 WHERE id = ?2",
        (saved, id),
    )?;

    transaction.commit()?;

    tracing::info!(id, amount, saved, "added savings contribution");

    Ok(saved)
}

/// Delete a savings goal by ID. Returns an error if the goal doesn't exist.
pub fn delete_savings_goal(id: SavingsGoalId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM savings_goal WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissing(RecordKind::Savings));
    }

    tracing::info!(id, "deleted savings goal");

    Ok(())
}

fn map_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(SavingsGoal {
        id: row.get(0)?,
        name: Label::new_unchecked(&raw_name),
        target_amount: row.get(2)?,
        saved_amount: row.get(3)?,
        monthly_contribution: row.get(4)?,
        date: row.get(5)?,
    })
}
