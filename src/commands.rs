//! The `finance` command line: one subcommand per user action.
//!
//! [run] executes a parsed [Command] against a [Store] and returns the text to
//! print, either as human readable lines or as JSON when `--json` is set.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use time::{Date, macros::format_description};

use crate::{
    Breakdown, Config, Currency, Error, Label, NewRecord, Overview, Record, RecordId, RecordKind,
    Store, Summary,
    debt::{DebtPayment, NewDebt, PayoffComparison, RepaymentProjection, ScheduleRow},
    expense::{NewExpense, PaymentMethod},
    format_currency,
    income::NewIncome,
    savings::{NewSavingsGoal, SavingsGoal},
};

/// A user action.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record and review money earned.
    Income {
        /// What to do with income entries.
        #[command(subcommand)]
        action: IncomeAction,
    },
    /// Record and review money spent.
    Expense {
        /// What to do with expenses.
        #[command(subcommand)]
        action: ExpenseAction,
    },
    /// Manage savings goals.
    Savings {
        /// What to do with savings goals.
        #[command(subcommand)]
        action: SavingsAction,
    },
    /// Manage debts and plan their repayment.
    Debt {
        /// What to do with debts.
        #[command(subcommand)]
        action: DebtAction,
    },
    /// Show total income, expenses, balance, savings and debt.
    Summary,
    /// Show the summary and the balance left after savings and debt.
    Overview,
    /// Show amounts summed by category.
    Breakdown {
        /// Which records to group.
        #[arg(value_enum, default_value = "expense")]
        kind: BreakdownKind,
    },
    /// Delete every record. This cannot be undone.
    Reset {
        /// Confirm that every record should be deleted.
        #[arg(long)]
        yes: bool,
    },
}

/// The records a breakdown can group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BreakdownKind {
    /// Group income entries.
    Income,
    /// Group expenses.
    Expense,
}

/// Actions on income entries.
#[derive(Debug, Subcommand)]
pub enum IncomeAction {
    /// Record money earned.
    Add(IncomeFields),
    /// List every income entry, oldest first.
    List,
    /// Replace the fields of an income entry.
    Update {
        /// The ID of the income entry.
        id: RecordId,
        /// The new values for every field of the income entry.
        #[command(flatten)]
        fields: IncomeFields,
    },
    /// Delete an income entry.
    Delete {
        /// The ID of the income entry.
        id: RecordId,
    },
}

/// The fields of an income entry.
#[derive(Debug, Args)]
pub struct IncomeFields {
    /// The amount earned.
    #[arg(long, allow_negative_numbers = true)]
    pub amount: f64,
    /// The category, e.g. "Salary".
    #[arg(long)]
    pub category: String,
    /// Where the money came from.
    #[arg(long, default_value = "")]
    pub source: String,
    /// The date received as YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
}

/// Actions on expenses.
#[derive(Debug, Subcommand)]
pub enum ExpenseAction {
    /// Record money spent.
    Add(ExpenseFields),
    /// List every expense, oldest first.
    List,
    /// Replace the fields of an expense.
    Update {
        /// The ID of the expense.
        id: RecordId,
        /// The new values for every field of the expense.
        #[command(flatten)]
        fields: ExpenseFields,
    },
    /// Delete an expense.
    Delete {
        /// The ID of the expense.
        id: RecordId,
    },
}

/// The fields of an expense.
#[derive(Debug, Args)]
pub struct ExpenseFields {
    /// The amount spent.
    #[arg(long, allow_negative_numbers = true)]
    pub amount: f64,
    /// The category, e.g. "Rent".
    #[arg(long)]
    pub category: String,
    /// How the expense was paid.
    #[arg(long, value_enum, default_value = "other")]
    pub payment_method: PaymentMethod,
    /// The date spent as YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
}

/// Actions on savings goals.
#[derive(Debug, Subcommand)]
pub enum SavingsAction {
    /// Start a savings goal.
    Add(SavingsFields),
    /// List every savings goal with its progress.
    List,
    /// Replace the fields of a savings goal, including the amount saved.
    Update {
        /// The ID of the goal.
        id: RecordId,
        /// The new values for every field of the goal.
        #[command(flatten)]
        fields: SavingsFields,
    },
    /// Delete a savings goal.
    Delete {
        /// The ID of the goal.
        id: RecordId,
    },
    /// Add money to a savings goal.
    Contribute {
        /// The ID of the goal.
        id: RecordId,
        /// The amount to add.
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
}

/// The fields of a savings goal.
#[derive(Debug, Args)]
pub struct SavingsFields {
    /// What the savings are for.
    #[arg(long)]
    pub name: String,
    /// The amount to reach. Zero for no target.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub target: f64,
    /// The amount already saved.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub saved: f64,
    /// The planned monthly contribution.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub monthly: f64,
    /// The date the goal was started as YYYY-MM-DD. Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<Date>,
}

/// Actions on debts.
#[derive(Debug, Subcommand)]
pub enum DebtAction {
    /// Record a debt.
    Add(DebtFields),
    /// List every debt.
    List,
    /// Replace the fields of a debt.
    Update {
        /// The ID of the debt.
        id: RecordId,
        /// The new values for every field of the debt.
        #[command(flatten)]
        fields: DebtFields,
    },
    /// Delete a debt and its payment history.
    Delete {
        /// The ID of the debt.
        id: RecordId,
    },
    /// Change the minimum monthly payment of a debt.
    SetMinimum {
        /// The ID of the debt.
        id: RecordId,
        /// The new minimum payment.
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
    /// Pay an extra amount off a debt.
    Pay {
        /// The ID of the debt.
        id: RecordId,
        /// The amount paid.
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        /// The date paid as YYYY-MM-DD. Defaults to today.
        #[arg(long, value_parser = parse_date)]
        date: Option<Date>,
    },
    /// List the extra payments made against a debt.
    Payments {
        /// The ID of the debt.
        id: RecordId,
    },
    /// Work out how long a debt takes to pay off.
    Project {
        /// The ID of the debt.
        id: RecordId,
        /// Pay this much on top of the minimum each month and compare.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        extra: f64,
    },
    /// Show the month-by-month repayment schedule of a debt.
    Schedule {
        /// The ID of the debt.
        id: RecordId,
        /// Pay this much on top of the minimum each month.
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        extra: f64,
    },
}

/// The fields of a debt.
#[derive(Debug, Args)]
pub struct DebtFields {
    /// Who the money is owed to.
    #[arg(long)]
    pub name: String,
    /// The amount owed.
    #[arg(long, allow_negative_numbers = true)]
    pub principal: f64,
    /// The annual interest rate as a percentage, e.g. 19.99.
    #[arg(long, allow_negative_numbers = true)]
    pub rate: f64,
    /// The minimum monthly payment.
    #[arg(long, allow_negative_numbers = true)]
    pub minimum: f64,
}

/// Parse a date in the `YYYY-MM-DD` format.
pub fn parse_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
}

/// Execute `command` and return what should be printed.
///
/// # Errors
/// Returns the [Error] of the failed operation. Nothing is written when an error is returned.
pub fn run(command: Command, store: &Store, config: &Config) -> Result<String, Error> {
    tracing::debug!(?command, "running command");

    match command {
        Command::Income { action } => run_income(action, store, config),
        Command::Expense { action } => run_expense(action, store, config),
        Command::Savings { action } => run_savings(action, store, config),
        Command::Debt { action } => run_debt(action, store, config),
        Command::Summary => {
            let summary = store.summary()?;
            render(&summary, config, |summary| {
                describe_summary(summary, config.currency)
            })
        }
        Command::Overview => {
            let overview = store.overview()?;
            render(&overview, config, |overview| {
                describe_overview(overview, config.currency)
            })
        }
        Command::Breakdown { kind } => {
            let breakdown = match kind {
                BreakdownKind::Income => store.income_breakdown()?,
                BreakdownKind::Expense => store.category_breakdown()?,
            };
            render(&breakdown, config, |breakdown| {
                describe_breakdown(breakdown, config.currency)
            })
        }
        Command::Reset { yes: false } => render(&json!({ "reset": false }), config, |_| {
            "Nothing was deleted. Pass --yes to delete every record.".to_owned()
        }),
        Command::Reset { yes: true } => {
            store.reset_all()?;
            render(&json!({ "reset": true }), config, |_| {
                "Deleted every record.".to_owned()
            })
        }
    }
}

/// The store operations shared by every record kind.
enum RecordAction {
    Add(NewRecord),
    List(RecordKind),
    Update(RecordId, NewRecord),
    Delete(RecordKind, RecordId),
}

fn run_record_action(action: RecordAction, store: &Store, config: &Config) -> Result<String, Error> {
    match action {
        RecordAction::Add(record) => {
            let kind = record.kind();
            let id = store.create(record)?;
            render(&json!({ "kind": kind, "id": id }), config, |_| {
                format!("Added {kind} #{id}.")
            })
        }
        RecordAction::List(kind) => {
            let records = store.list(kind)?;
            render(&records, config, |records| {
                describe_records(records, kind, config.currency)
            })
        }
        RecordAction::Update(id, record) => {
            let kind = record.kind();
            store.update(id, record)?;
            render(&json!({ "kind": kind, "id": id }), config, |_| {
                format!("Updated {kind} #{id}.")
            })
        }
        RecordAction::Delete(kind, id) => {
            store.delete(kind, id)?;
            render(&json!({ "kind": kind, "id": id }), config, |_| {
                format!("Deleted {kind} #{id}.")
            })
        }
    }
}

fn run_income(action: IncomeAction, store: &Store, config: &Config) -> Result<String, Error> {
    let action = match action {
        IncomeAction::Add(fields) => RecordAction::Add(fields.into_record(config)?),
        IncomeAction::List => RecordAction::List(RecordKind::Income),
        IncomeAction::Update { id, fields } => {
            RecordAction::Update(id, fields.into_record(config)?)
        }
        IncomeAction::Delete { id } => RecordAction::Delete(RecordKind::Income, id),
    };

    run_record_action(action, store, config)
}

fn run_expense(action: ExpenseAction, store: &Store, config: &Config) -> Result<String, Error> {
    let action = match action {
        ExpenseAction::Add(fields) => RecordAction::Add(fields.into_record(config)?),
        ExpenseAction::List => RecordAction::List(RecordKind::Expense),
        ExpenseAction::Update { id, fields } => {
            RecordAction::Update(id, fields.into_record(config)?)
        }
        ExpenseAction::Delete { id } => RecordAction::Delete(RecordKind::Expense, id),
    };

    run_record_action(action, store, config)
}

fn run_savings(action: SavingsAction, store: &Store, config: &Config) -> Result<String, Error> {
    let action = match action {
        SavingsAction::Add(fields) => RecordAction::Add(fields.into_record(config)?),
        SavingsAction::List => RecordAction::List(RecordKind::Savings),
        SavingsAction::Update { id, fields } => {
            RecordAction::Update(id, fields.into_record(config)?)
        }
        SavingsAction::Delete { id } => RecordAction::Delete(RecordKind::Savings, id),
        SavingsAction::Contribute { id, amount } => {
            let saved_amount = store.add_contribution(id, amount)?;
            return render(
                &json!({ "id": id, "saved_amount": saved_amount }),
                config,
                |_| {
                    format!(
                        "Savings goal #{id} now has {} saved.",
                        format_currency(saved_amount, config.currency)
                    )
                },
            );
        }
    };

    run_record_action(action, store, config)
}

fn run_debt(action: DebtAction, store: &Store, config: &Config) -> Result<String, Error> {
    let currency = config.currency;

    let action = match action {
        DebtAction::Add(fields) => RecordAction::Add(fields.into_record()?),
        DebtAction::List => RecordAction::List(RecordKind::Debt),
        DebtAction::Update { id, fields } => RecordAction::Update(id, fields.into_record()?),
        DebtAction::Delete { id } => RecordAction::Delete(RecordKind::Debt, id),
        DebtAction::SetMinimum { id, amount } => {
            let minimum_payment = store.set_minimum_payment(id, amount)?;
            return render(
                &json!({ "id": id, "minimum_payment": minimum_payment }),
                config,
                |_| {
                    format!(
                        "Debt #{id} now has a minimum payment of {}.",
                        format_currency(minimum_payment, currency)
                    )
                },
            );
        }
        DebtAction::Pay { id, amount, date } => {
            let date = resolve_date(date, config)?;
            let balance = store.apply_extra_payment(id, amount, date)?;
            return render(&json!({ "id": id, "principal": balance }), config, |_| {
                if balance == 0.0 {
                    format!("Debt #{id} is paid off.")
                } else {
                    format!(
                        "Debt #{id} now has {} left to pay.",
                        format_currency(balance, currency)
                    )
                }
            });
        }
        DebtAction::Payments { id } => {
            let payments = store.list_debt_payments(id)?;
            return render(&payments, config, |payments| {
                describe_payments(payments, currency)
            });
        }
        DebtAction::Project { id, extra } if extra > 0.0 => {
            return match store.compare_debt_payoff(id, extra) {
                Ok(comparison) => render(&comparison, config, |comparison| {
                    describe_comparison(comparison, extra, currency)
                }),
                // The minimum alone never pays the debt off, so there is nothing to compare.
                Err(Error::InvalidInput(_)) => {
                    let projection = store.project_debt(id, extra)?;
                    render(&projection, config, |projection| {
                        describe_projection(projection, currency)
                    })
                }
                Err(error) => Err(error),
            };
        }
        DebtAction::Project { id, extra } => {
            let projection = store.project_debt(id, extra)?;
            return render(&projection, config, |projection| {
                describe_projection(projection, currency)
            });
        }
        DebtAction::Schedule { id, extra } => {
            let rows = store.debt_schedule(id, extra)?;
            return render(&rows, config, |rows| describe_schedule(rows, currency));
        }
    };

    run_record_action(action, store, config)
}

impl IncomeFields {
    fn into_record(self, config: &Config) -> Result<NewRecord, Error> {
        Ok(NewRecord::Income(NewIncome {
            source: self.source,
            amount: self.amount,
            category: Label::new(&self.category)?,
            date: resolve_date(self.date, config)?,
        }))
    }
}

impl ExpenseFields {
    fn into_record(self, config: &Config) -> Result<NewRecord, Error> {
        Ok(NewRecord::Expense(NewExpense {
            amount: self.amount,
            category: Label::new(&self.category)?,
            payment_method: self.payment_method,
            date: resolve_date(self.date, config)?,
        }))
    }
}

impl SavingsFields {
    fn into_record(self, config: &Config) -> Result<NewRecord, Error> {
        Ok(NewRecord::Savings(NewSavingsGoal {
            name: Label::new(&self.name)?,
            target_amount: self.target,
            saved_amount: self.saved,
            monthly_contribution: self.monthly,
            date: resolve_date(self.date, config)?,
        }))
    }
}

impl DebtFields {
    fn into_record(self) -> Result<NewRecord, Error> {
        Ok(NewRecord::Debt(NewDebt {
            name: Label::new(&self.name)?,
            principal: self.principal,
            annual_rate: self.rate,
            minimum_payment: self.minimum,
        }))
    }
}

fn resolve_date(date: Option<Date>, config: &Config) -> Result<Date, Error> {
    match date {
        Some(date) => Ok(date),
        None => config.today(),
    }
}

fn render<T: Serialize + ?Sized>(
    value: &T,
    config: &Config,
    describe: impl FnOnce(&T) -> String,
) -> Result<String, Error> {
    if config.json {
        serde_json::to_string_pretty(value).map_err(|error| Error::Serialization(error.to_string()))
    } else {
        Ok(describe(value))
    }
}

fn describe_records(records: &[Record], kind: RecordKind, currency: Currency) -> String {
    if records.is_empty() {
        return format!("No {kind} has been recorded.");
    }

    records
        .iter()
        .map(|record| describe_record(record, currency))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_record(record: &Record, currency: Currency) -> String {
    match record {
        Record::Income(income) => {
            let mut line = format!(
                "#{} {} {} {}",
                income.id,
                income.date,
                income.category,
                format_currency(income.amount, currency)
            );
            if !income.source.is_empty() {
                line.push_str(&format!(" from {}", income.source));
            }
            line
        }
        Record::Expense(expense) => format!(
            "#{} {} {} {} ({})",
            expense.id,
            expense.date,
            expense.category,
            format_currency(expense.amount, currency),
            expense.payment_method
        ),
        Record::Savings(goal) => describe_savings_goal(goal, currency),
        Record::Debt(debt) => format!(
            "#{} {}: {} owed at {}% a year, minimum {} a month",
            debt.id,
            debt.name,
            format_currency(debt.principal, currency),
            debt.annual_rate,
            format_currency(debt.minimum_payment, currency)
        ),
    }
}

fn describe_savings_goal(goal: &SavingsGoal, currency: Currency) -> String {
    let mut line = format!(
        "#{} {}: {} saved",
        goal.id,
        goal.name,
        format_currency(goal.saved_amount, currency)
    );

    if goal.target_amount > 0.0 {
        let progress = goal.progress();
        line.push_str(&format!(
            " of {}, {} to go",
            format_currency(goal.target_amount, currency),
            format_currency(progress.remaining, currency)
        ));

        if let Some(months) = progress.months_to_goal {
            line.push_str(&format!(" (about {} months)", months.ceil()));
        }
    }

    line
}

fn describe_summary(summary: &Summary, currency: Currency) -> String {
    [
        ("Total income", summary.total_income),
        ("Total expenses", summary.total_expenses),
        ("Balance", summary.balance),
        ("Total savings", summary.total_savings),
        ("Total debt", summary.total_debt),
    ]
    .into_iter()
    .map(|(name, amount)| format!("{:<16}{}", format!("{name}:"), format_currency(amount, currency)))
    .collect::<Vec<_>>()
    .join("\n")
}

fn describe_overview(overview: &Overview, currency: Currency) -> String {
    let summary = &overview.summary;

    [
        ("Total income", summary.total_income),
        ("Total expenses", summary.total_expenses),
        ("Total savings", summary.total_savings),
        ("Monthly savings", overview.monthly_savings),
        ("Total debt", summary.total_debt),
        ("Debt payments", overview.total_debt_payments),
        ("Remaining balance", overview.remaining_balance),
        (
            "Remaining balance without debt",
            overview.remaining_balance_without_debt,
        ),
    ]
    .into_iter()
    .map(|(name, amount)| format!("{:<32}{}", format!("{name}:"), format_currency(amount, currency)))
    .collect::<Vec<_>>()
    .join("\n")
}

fn describe_breakdown(breakdown: &Breakdown, currency: Currency) -> String {
    if breakdown.is_empty() {
        return "Nothing recorded.".to_owned();
    }

    breakdown
        .iter()
        .map(|(category, amount)| format!("{category}: {}", format_currency(*amount, currency)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_payments(payments: &[DebtPayment], currency: Currency) -> String {
    if payments.is_empty() {
        return "No payments recorded.".to_owned();
    }

    payments
        .iter()
        .map(|payment| {
            format!(
                "#{} {}: paid {}, {} left",
                payment.id,
                payment.date,
                format_currency(payment.applied_amount, currency),
                format_currency(payment.balance_after, currency)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_projection(projection: &RepaymentProjection, currency: Currency) -> String {
    if projection.months_to_payoff == 0 {
        return "Nothing left to pay.".to_owned();
    }

    format!(
        "Paid off in {} months ({:.1} years) with {} of interest.",
        projection.months_to_payoff,
        projection.years(),
        format_currency(projection.total_interest_paid, currency)
    )
}

fn describe_comparison(comparison: &PayoffComparison, extra: f64, currency: Currency) -> String {
    format!(
        "Minimum only: {}\nWith {} extra: {}\nSaves {} months and {} of interest.",
        describe_projection(&comparison.minimum_only, currency),
        format_currency(extra, currency),
        describe_projection(&comparison.with_extra, currency),
        comparison.months_saved,
        format_currency(comparison.interest_saved, currency)
    )
}

fn describe_schedule(rows: &[ScheduleRow], currency: Currency) -> String {
    let header = format!(
        "{:>5} {:>14} {:>14} {:>14} {:>14}",
        "Month", "Payment", "Interest", "Principal", "Balance"
    );

    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            format!(
                "{:>5} {:>14} {:>14} {:>14} {:>14}",
                row.month,
                format_currency(row.payment, currency),
                format_currency(row.interest, currency),
                format_currency(row.principal_paid, currency),
                format_currency(row.balance, currency)
            )
        }))
        .collect::<Vec<_>>()
        .join("\n")
}
