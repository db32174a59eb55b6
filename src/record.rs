//! Tagged records, one variant per kind of record the store holds.

use std::{fmt::Display, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{
    ValidationError,
    debt::{Debt, NewDebt},
    expense::{Expense, NewExpense},
    income::{Income, NewIncome},
    savings::{NewSavingsGoal, SavingsGoal},
};

/// Database identifier shared by every record kind.
pub type RecordId = i64;

/// The kinds of record kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
    /// A savings goal.
    Savings,
    /// Money owed.
    Debt,
}

impl RecordKind {
    /// Every record kind, in the order they are listed on the dashboard.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Income,
        RecordKind::Expense,
        RecordKind::Savings,
        RecordKind::Debt,
    ];
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Income => "income entry",
            RecordKind::Expense => "expense",
            RecordKind::Savings => "savings goal",
            RecordKind::Debt => "debt",
        };

        write!(f, "{name}")
    }
}

impl FromStr for RecordKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(RecordKind::Income),
            "expense" => Ok(RecordKind::Expense),
            "savings" => Ok(RecordKind::Savings),
            "debt" => Ok(RecordKind::Debt),
            _ => Err(ValidationError::Unparsable {
                field: "record kind",
                value: s.to_owned(),
            }),
        }
    }
}

/// The fields of a record that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NewRecord {
    /// A new income entry.
    Income(NewIncome),
    /// A new expense.
    Expense(NewExpense),
    /// A new savings goal.
    Savings(NewSavingsGoal),
    /// A new debt.
    Debt(NewDebt),
}

impl NewRecord {
    /// The kind of record this will become.
    pub fn kind(&self) -> RecordKind {
        match self {
            NewRecord::Income(_) => RecordKind::Income,
            NewRecord::Expense(_) => RecordKind::Expense,
            NewRecord::Savings(_) => RecordKind::Savings,
            NewRecord::Debt(_) => RecordKind::Debt,
        }
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// An income entry.
    Income(Income),
    /// An expense.
    Expense(Expense),
    /// A savings goal.
    Savings(SavingsGoal),
    /// A debt.
    Debt(Debt),
}

impl Record {
    /// The kind of this record.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Income(_) => RecordKind::Income,
            Record::Expense(_) => RecordKind::Expense,
            Record::Savings(_) => RecordKind::Savings,
            Record::Debt(_) => RecordKind::Debt,
        }
    }

    /// The database ID of this record.
    pub fn id(&self) -> RecordId {
        match self {
            Record::Income(income) => income.id,
            Record::Expense(expense) => expense.id,
            Record::Savings(goal) => goal.id,
            Record::Debt(debt) => debt.id,
        }
    }
}
