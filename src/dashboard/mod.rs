//! Dashboard module
//!
//! Provides the headline figures: income, expenses, the balance, savings and
//! outstanding debt, plus per-category breakdowns and the monthly overview.
//! Every figure is recomputed from the database on each call.

mod aggregation;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub use aggregation::Breakdown;

use crate::{
    Error,
    dashboard::aggregation::{group_by_category, sum_amounts},
};

/// The headline figures of the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expenses: f64,
    /// Income minus expenses. Negative when the user has spent more than they earned.
    pub balance: f64,
    /// The sum saved across all savings goals.
    pub total_savings: f64,
    /// The principal still owed across all debts.
    pub total_debt: f64,
}

/// Compute the dashboard summary from the current contents of the database.
///
/// # Errors
/// Returns [Error::SqlError] if any of the queries fail.
pub fn get_summary(connection: &Connection) -> Result<Summary, Error> {
    let total_income = get_column_total(connection, "SELECT amount FROM income")?;
    let total_expenses = get_column_total(connection, "SELECT amount FROM expense")?;
    let total_savings = get_column_total(connection, "SELECT saved_amount FROM savings_goal")?;
    let total_debt = get_column_total(connection, "SELECT principal FROM debt")?;

    let summary = Summary {
        total_income,
        total_expenses,
        balance: sum_amounts([total_income, -total_expenses]),
        total_savings,
        total_debt,
    };

    tracing::debug!(?summary, "computed summary");

    Ok(summary)
}

/// The summary together with what is left once savings and debt are set aside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    /// The headline figures.
    #[serde(flatten)]
    pub summary: Summary,
    /// The sum of the monthly contributions planned across all savings goals.
    pub monthly_savings: f64,
    /// The sum applied to debts by extra payments.
    pub total_debt_payments: f64,
    /// Income minus expenses, monthly savings and the principal still owed.
    pub remaining_balance: f64,
    /// Income minus expenses, monthly savings and the extra payments already made.
    pub remaining_balance_without_debt: f64,
}

/// Compute the overview from the current contents of the database.
///
/// # Errors
/// Returns [Error::SqlError] if any of the queries fail.
pub fn get_overview(connection: &Connection) -> Result<Overview, Error> {
    let summary = get_summary(connection)?;
    let monthly_savings =
        get_column_total(connection, "SELECT monthly_contribution FROM savings_goal")?;
    let total_debt_payments =
        get_column_total(connection, "SELECT applied_amount FROM debt_payment")?;

    let overview = Overview {
        summary,
        monthly_savings,
        total_debt_payments,
        remaining_balance: sum_amounts([
            summary.total_income,
            -summary.total_expenses,
            -monthly_savings,
            -summary.total_debt,
        ]),
        remaining_balance_without_debt: sum_amounts([
            summary.total_income,
            -summary.total_expenses,
            -monthly_savings,
            -total_debt_payments,
        ]),
    };

    tracing::debug!(?overview, "computed overview");

    Ok(overview)
}

/// Sum expenses by category, in ascending order of category.
pub fn get_expense_breakdown(connection: &Connection) -> Result<Breakdown, Error> {
    get_breakdown(connection, "SELECT category, amount FROM expense")
}

/// Sum income by category, in ascending order of category.
pub fn get_income_breakdown(connection: &Connection) -> Result<Breakdown, Error> {
    get_breakdown(connection, "SELECT category, amount FROM income")
}

fn get_column_total(connection: &Connection, query: &str) -> Result<f64, Error> {
    let amounts = connection
        .prepare(query)?
        .query_map([], |row| row.get::<_, f64>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sum_amounts(amounts))
}

fn get_breakdown(connection: &Connection, query: &str) -> Result<Breakdown, Error> {
    let entries = connection
        .prepare(query)?
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(group_by_category(entries))
}

#[cfg(test)]
mod summary_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Label,
        db::{initialize, reset},
        debt::{NewDebt, apply_extra_payment, create_debt},
        expense::{NewExpense, PaymentMethod, create_expense},
        income::{NewIncome, create_income},
        savings::{NewSavingsGoal, add_contribution, create_savings_goal},
    };

    use super::{
        Overview, Summary, get_expense_breakdown, get_income_breakdown, get_overview, get_summary,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn add_income(conn: &Connection, amount: f64, category: &str) {
        create_income(
            NewIncome {
                source: String::new(),
                amount,
                category: Label::new_unchecked(category),
                date: date!(2025 - 01 - 01),
            },
            conn,
        )
        .unwrap();
    }

    fn add_expense(conn: &Connection, amount: f64, category: &str) {
        create_expense(
            NewExpense {
                amount,
                category: Label::new_unchecked(category),
                payment_method: PaymentMethod::DebitCard,
                date: date!(2025 - 01 - 02),
            },
            conn,
        )
        .unwrap();
    }

    #[test]
    fn empty_database_has_zero_summary() {
        let conn = get_test_connection();

        assert_eq!(get_summary(&conn), Ok(Summary::default()));
    }

    #[test]
    fn balance_is_income_minus_expenses() {
        let conn = get_test_connection();
        add_income(&conn, 2000.0, "Salary");
        add_income(&conn, 1000.0, "Freelance");
        add_expense(&conn, 700.0, "Rent");
        add_expense(&conn, 500.0, "Food");

        let summary = get_summary(&conn).unwrap();

        assert_eq!(summary.total_income, 3000.0);
        assert_eq!(summary.total_expenses, 1200.0);
        assert_eq!(summary.balance, 1800.0);
    }

    #[test]
    fn balance_may_be_negative() {
        let conn = get_test_connection();
        add_income(&conn, 100.0, "Salary");
        add_expense(&conn, 250.75, "Rent");

        assert_eq!(get_summary(&conn).unwrap().balance, -150.75);
    }

    #[test]
    fn savings_and_debt_totals_follow_mutations() {
        let conn = get_test_connection();
        let goal = create_savings_goal(
            NewSavingsGoal {
                name: Label::new_unchecked("House"),
                target_amount: 50_000.0,
                saved_amount: 1000.0,
                monthly_contribution: 500.0,
                date: date!(2025 - 01 - 01),
            },
            &conn,
        )
        .unwrap();
        add_contribution(goal.id, 250.0, &conn).unwrap();
        let loan = create_debt(
            NewDebt {
                name: Label::new_unchecked("Student loan"),
                principal: 12_000.0,
                annual_rate: 4.5,
                minimum_payment: 150.0,
            },
            &conn,
        )
        .unwrap();
        create_debt(
            NewDebt {
                name: Label::new_unchecked("Credit card"),
                principal: 800.0,
                annual_rate: 21.0,
                minimum_payment: 25.0,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(get_summary(&conn).unwrap().total_savings, 1250.0);
        assert_eq!(get_summary(&conn).unwrap().total_debt, 12_800.0);

        apply_extra_payment(loan.id, 2000.0, date!(2025 - 02 - 01), &conn).unwrap();

        assert_eq!(get_summary(&conn).unwrap().total_debt, 10_800.0);
    }

    #[test]
    fn summary_is_stable_without_mutations() {
        let conn = get_test_connection();
        add_income(&conn, 0.1, "Interest");
        add_income(&conn, 0.2, "Interest");
        add_expense(&conn, 0.3, "Fees");

        let first = get_summary(&conn).unwrap();
        let second = get_summary(&conn).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.balance, 0.0);
    }

    #[test]
    fn reset_then_summary_is_all_zeros() {
        let conn = get_test_connection();
        add_income(&conn, 3000.0, "Salary");
        add_expense(&conn, 1200.0, "Rent");

        reset(&conn).unwrap();

        assert_eq!(
            get_summary(&conn),
            Ok(Summary {
                total_income: 0.0,
                total_expenses: 0.0,
                balance: 0.0,
                total_savings: 0.0,
                total_debt: 0.0,
            })
        );
    }

    #[test]
    fn empty_database_has_zero_overview() {
        let conn = get_test_connection();

        assert_eq!(get_overview(&conn), Ok(Overview::default()));
    }

    #[test]
    fn overview_sets_aside_savings_and_debt() {
        let conn = get_test_connection();
        add_income(&conn, 3000.0, "Salary");
        add_expense(&conn, 1200.0, "Rent");
        create_savings_goal(
            NewSavingsGoal {
                name: Label::new_unchecked("Holiday"),
                target_amount: 2000.0,
                saved_amount: 400.0,
                monthly_contribution: 200.0,
                date: date!(2025 - 01 - 01),
            },
            &conn,
        )
        .unwrap();
        let card = create_debt(
            NewDebt {
                name: Label::new_unchecked("Credit card"),
                principal: 1000.0,
                annual_rate: 18.0,
                minimum_payment: 50.0,
            },
            &conn,
        )
        .unwrap();
        apply_extra_payment(card.id, 250.0, date!(2025 - 02 - 01), &conn).unwrap();

        let overview = get_overview(&conn).unwrap();

        assert_eq!(overview.summary, get_summary(&conn).unwrap());
        assert_eq!(overview.monthly_savings, 200.0);
        assert_eq!(overview.total_debt_payments, 250.0);
        // 3000 - 1200 - 200 - 750 still owed
        assert_eq!(overview.remaining_balance, 850.0);
        // 3000 - 1200 - 200 - 250 paid off
        assert_eq!(overview.remaining_balance_without_debt, 1350.0);
    }

    #[test]
    fn overview_counts_only_the_applied_part_of_an_overpayment() {
        let conn = get_test_connection();
        add_income(&conn, 500.0, "Salary");
        let loan = create_debt(
            NewDebt {
                name: Label::new_unchecked("Loan"),
                principal: 100.0,
                annual_rate: 5.0,
                minimum_payment: 10.0,
            },
            &conn,
        )
        .unwrap();
        apply_extra_payment(loan.id, 300.0, date!(2025 - 02 - 01), &conn).unwrap();

        let overview = get_overview(&conn).unwrap();

        assert_eq!(overview.total_debt_payments, 100.0);
        assert_eq!(overview.remaining_balance, 500.0);
        assert_eq!(overview.remaining_balance_without_debt, 400.0);
    }

    #[test]
    fn expense_breakdown_groups_and_sorts_categories() {
        let conn = get_test_connection();
        add_expense(&conn, 30.0, "Utilities");
        add_expense(&conn, 12.5, "Food");
        add_expense(&conn, 1100.0, "Rent");
        add_expense(&conn, 7.5, "Food");

        let breakdown = get_expense_breakdown(&conn).unwrap();

        assert_eq!(
            breakdown.into_iter().collect::<Vec<_>>(),
            vec![
                ("Food".to_owned(), 20.0),
                ("Rent".to_owned(), 1100.0),
                ("Utilities".to_owned(), 30.0),
            ]
        );
    }

    #[test]
    fn income_breakdown_ignores_expenses() {
        let conn = get_test_connection();
        add_income(&conn, 2500.0, "Salary");
        add_expense(&conn, 40.0, "Food");

        let breakdown = get_income_breakdown(&conn).unwrap();

        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown["Salary"], 2500.0);
    }
}
