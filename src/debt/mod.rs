//! Debts, the extra payments made against them, and repayment projections.

mod core;
mod payment;
mod repayment;

pub use self::core::{
    Debt, DebtId, NewDebt, create_debt, create_debt_table, delete_debt, get_all_debts, get_debt,
    set_minimum_payment, update_debt,
};
pub use payment::{
    DebtPayment, DebtPaymentId, apply_extra_payment, create_debt_payment_table, get_debt_payments,
};
pub use repayment::{
    MAX_MONTHS, PayoffComparison, PayoffError, RepaymentProjection, ScheduleRow, compare, project,
    schedule,
};
