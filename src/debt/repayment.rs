//! Month-by-month debt repayment projections.
//!
//! Interest compounds monthly at `annual_rate / 100 / 12`. Every amount is
//! converted to whole cents before the simulation starts and each month's
//! interest is rounded to the nearest cent (half away from zero), so the
//! results are exact and repeatable:
//!
//! 1. `interest = round(balance * monthly_rate)`
//! 2. fail if the payment does not exceed `interest`
//! 3. `balance = max(0, balance - (payment - interest))`
//!
//! The loop stops once the balance reaches zero, or fails once [MAX_MONTHS]
//! have passed.

use serde::{Deserialize, Serialize};

use crate::money::{MAX_AMOUNT, from_cents, to_cents};

/// The longest repayment horizon the calculator will simulate (100 years).
pub const MAX_MONTHS: u64 = 1200;

/// Why a payoff could not be computed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayoffError {
    /// The principal, rate or payment was negative or not a finite number.
    #[error("{0} must be a finite, non-negative number")]
    InvalidTerm(&'static str),

    /// The principal or payment was larger than [MAX_AMOUNT].
    #[error("{0} must not be more than 10 trillion")]
    OutOfRange(&'static str),

    /// The monthly payment was zero, or rounded to zero cents.
    #[error("the monthly payment must be greater than zero")]
    NonPositivePayment,

    /// The payment is swallowed by interest, so the balance never shrinks.
    #[error(
        "a monthly payment of {payment:.2} does not cover the {interest:.2} of interest charged each month"
    )]
    PaymentDoesNotCoverInterest {
        /// The monthly payment.
        payment: f64,
        /// The interest charged in the month the payment fell short.
        interest: f64,
    },

    /// The balance was still above zero after [MAX_MONTHS] months.
    #[error("the debt would take longer than {0} months to repay")]
    ExceedsHorizon(u64),
}

/// How long a debt takes to repay and what it costs in interest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RepaymentProjection {
    /// The number of monthly payments until the balance reaches zero.
    pub months_to_payoff: u64,
    /// The sum of the interest charged over those months.
    pub total_interest_paid: f64,
}

impl RepaymentProjection {
    /// The payoff time in years.
    pub fn years(&self) -> f64 {
        self.months_to_payoff as f64 / 12.0
    }
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// The month number, starting at 1.
    pub month: u64,
    /// What was actually paid this month. Only the final month can be less than the regular
    /// payment.
    pub payment: f64,
    /// The interest charged this month.
    pub interest: f64,
    /// The part of the payment that reduced the balance.
    pub principal_paid: f64,
    /// The balance left after the payment.
    pub balance: f64,
}

/// The effect of paying more than the minimum every month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffComparison {
    /// Paying only the minimum.
    pub minimum_only: RepaymentProjection,
    /// Paying the minimum plus the extra amount.
    pub with_extra: RepaymentProjection,
    /// How many fewer months the extra payments take.
    pub months_saved: u64,
    /// How much less interest the extra payments cost.
    pub interest_saved: f64,
}

/// Repayment terms in whole cents.
struct Terms {
    principal: i64,
    monthly_rate: f64,
    payment: i64,
}

impl Terms {
    fn new(principal: f64, annual_rate_pct: f64, monthly_payment: f64) -> Result<Self, PayoffError> {
        if !principal.is_finite() || principal < 0.0 {
            return Err(PayoffError::InvalidTerm("principal"));
        }

        if !annual_rate_pct.is_finite() || annual_rate_pct < 0.0 {
            return Err(PayoffError::InvalidTerm("interest rate"));
        }

        if !monthly_payment.is_finite() {
            return Err(PayoffError::InvalidTerm("monthly payment"));
        }

        if principal > MAX_AMOUNT {
            return Err(PayoffError::OutOfRange("principal"));
        }

        if monthly_payment > MAX_AMOUNT {
            return Err(PayoffError::OutOfRange("monthly payment"));
        }

        Ok(Self {
            principal: to_cents(principal),
            monthly_rate: annual_rate_pct / 100.0 / 12.0,
            payment: to_cents(monthly_payment),
        })
    }
}

/// A simulated month, in cents.
struct Month {
    number: u64,
    interest: i64,
    principal_paid: i64,
    balance: i64,
}

fn simulate(terms: &Terms, mut visit: impl FnMut(Month)) -> Result<(), PayoffError> {
    if terms.payment <= 0 {
        return Err(PayoffError::NonPositivePayment);
    }

    let mut balance = terms.principal;
    let mut number = 0;

    while balance > 0 {
        // Without interest every payment shrinks the balance, so the loop always ends.
        if terms.monthly_rate > 0.0 && number >= MAX_MONTHS {
            return Err(PayoffError::ExceedsHorizon(MAX_MONTHS));
        }

        let interest = (balance as f64 * terms.monthly_rate).round() as i64;

        if terms.payment <= interest {
            return Err(PayoffError::PaymentDoesNotCoverInterest {
                payment: from_cents(terms.payment),
                interest: from_cents(interest),
            });
        }

        let principal_paid = (terms.payment - interest).min(balance);
        balance -= principal_paid;
        number += 1;

        visit(Month {
            number,
            interest,
            principal_paid,
            balance,
        });
    }

    Ok(())
}

/// Project how many months it takes to repay `principal` at `annual_rate_pct` percent
/// with a fixed `monthly_payment`, and how much interest that costs.
///
/// A zero principal is already paid off. With a zero rate the answer is
/// `ceil(principal / monthly_payment)` months with no interest.
///
/// # Errors
///
/// Returns a [PayoffError] if the terms are invalid, the payment does not
/// cover the interest charged, or repayment takes longer than [MAX_MONTHS].
pub fn project(
    principal: f64,
    annual_rate_pct: f64,
    monthly_payment: f64,
) -> Result<RepaymentProjection, PayoffError> {
    let terms = Terms::new(principal, annual_rate_pct, monthly_payment)?;

    if terms.principal == 0 {
        return Ok(RepaymentProjection::default());
    }

    if terms.payment <= 0 {
        return Err(PayoffError::NonPositivePayment);
    }

    if terms.monthly_rate == 0.0 {
        // Both are positive here.
        let months = (terms.principal as u64).div_ceil(terms.payment as u64);

        return Ok(RepaymentProjection {
            months_to_payoff: months,
            total_interest_paid: 0.0,
        });
    }

    let mut months_to_payoff = 0;
    let mut total_interest = 0;

    simulate(&terms, |month| {
        months_to_payoff = month.number;
        total_interest += month.interest;
    })?;

    Ok(RepaymentProjection {
        months_to_payoff,
        total_interest_paid: from_cents(total_interest),
    })
}

/// List every month of the repayment that [project] simulates.
///
/// # Errors
///
/// Returns the same errors as [project].
pub fn schedule(
    principal: f64,
    annual_rate_pct: f64,
    monthly_payment: f64,
) -> Result<Vec<ScheduleRow>, PayoffError> {
    let terms = Terms::new(principal, annual_rate_pct, monthly_payment)?;

    if terms.principal == 0 {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();

    simulate(&terms, |month| {
        rows.push(ScheduleRow {
            month: month.number,
            payment: from_cents(month.interest + month.principal_paid),
            interest: from_cents(month.interest),
            principal_paid: from_cents(month.principal_paid),
            balance: from_cents(month.balance),
        })
    })?;

    Ok(rows)
}

/// Compare paying only `minimum_payment` with paying `minimum_payment + extra_payment` each
/// month.
///
/// # Errors
///
/// Returns a [PayoffError] if either projection fails, e.g. when the minimum payment alone
/// does not cover the interest.
pub fn compare(
    principal: f64,
    annual_rate_pct: f64,
    minimum_payment: f64,
    extra_payment: f64,
) -> Result<PayoffComparison, PayoffError> {
    if !extra_payment.is_finite() || extra_payment < 0.0 {
        return Err(PayoffError::InvalidTerm("extra payment"));
    }

    let minimum_only = project(principal, annual_rate_pct, minimum_payment)?;
    let with_extra = project(principal, annual_rate_pct, minimum_payment + extra_payment)?;

    Ok(PayoffComparison {
        minimum_only,
        with_extra,
        months_saved: minimum_only
            .months_to_payoff
            .saturating_sub(with_extra.months_to_payoff),
        interest_saved: from_cents(
            to_cents(minimum_only.total_interest_paid) - to_cents(with_extra.total_interest_paid),
        ),
    })
}

#[cfg(test)]
mod project_tests {
    use super::{MAX_AMOUNT, MAX_MONTHS, PayoffError, RepaymentProjection, project};

    #[test]
    fn twelve_percent_example() {
        // Month 1: interest 12.00, principal paid 95.00, balance 1105.00.
        let projection = project(1200.0, 12.0, 107.0);

        assert_eq!(
            projection,
            Ok(RepaymentProjection {
                months_to_payoff: 12,
                total_interest_paid: 79.16,
            })
        );
    }

    #[test]
    fn eighteen_percent_credit_card() {
        let projection = project(5000.0, 18.0, 150.0).unwrap();

        assert_eq!(projection.months_to_payoff, 47);
        assert_eq!(projection.total_interest_paid, 1983.61);
    }

    #[test]
    fn zero_principal_is_already_paid() {
        for (rate, payment) in [(0.0, 0.0), (12.0, 100.0), (99.0, -5.0)] {
            assert_eq!(
                project(0.0, rate, payment),
                Ok(RepaymentProjection {
                    months_to_payoff: 0,
                    total_interest_paid: 0.0
                })
            );
        }
    }

    #[test]
    fn zero_rate_is_linear() {
        assert_eq!(
            project(1000.0, 0.0, 300.0),
            Ok(RepaymentProjection {
                months_to_payoff: 4,
                total_interest_paid: 0.0
            })
        );
        assert_eq!(project(900.0, 0.0, 300.0).unwrap().months_to_payoff, 3);
    }

    #[test]
    fn zero_rate_is_not_capped() {
        let projection = project(1_000_000.0, 0.0, 1.0).unwrap();

        assert_eq!(projection.months_to_payoff, 1_000_000);
    }

    #[test]
    fn zero_rate_handles_the_largest_terms() {
        assert_eq!(
            project(MAX_AMOUNT, 0.0, MAX_AMOUNT).unwrap().months_to_payoff,
            1
        );
        assert_eq!(
            project(MAX_AMOUNT, 0.0, 0.01).unwrap().months_to_payoff,
            1_000_000_000_000_000
        );
    }

    #[test]
    fn terms_beyond_maximum_amount_are_rejected() {
        assert_eq!(
            project(1e17, 0.0, 1e17),
            Err(PayoffError::OutOfRange("principal"))
        );
        assert_eq!(
            project(1000.0, 12.0, 1e17),
            Err(PayoffError::OutOfRange("monthly payment"))
        );
    }

    #[test]
    fn non_positive_payment_is_rejected() {
        assert_eq!(
            project(1000.0, 5.0, 0.0),
            Err(PayoffError::NonPositivePayment)
        );
        assert_eq!(
            project(1000.0, 0.0, -10.0),
            Err(PayoffError::NonPositivePayment)
        );
        assert_eq!(
            project(1000.0, 0.0, 0.004),
            Err(PayoffError::NonPositivePayment)
        );
    }

    #[test]
    fn payment_equal_to_interest_is_rejected() {
        assert_eq!(
            project(1000.0, 12.0, 10.0),
            Err(PayoffError::PaymentDoesNotCoverInterest {
                payment: 10.0,
                interest: 10.0
            })
        );
    }

    #[test]
    fn payment_below_interest_is_rejected() {
        assert!(matches!(
            project(10_000.0, 24.0, 150.0),
            Err(PayoffError::PaymentDoesNotCoverInterest { .. })
        ));
    }

    #[test]
    fn payoff_beyond_horizon_is_rejected() {
        // 83.33 of interest against a payment of 100 barely dents the balance.
        assert_eq!(
            project(100_000.0, 1.0, 100.0),
            Err(PayoffError::ExceedsHorizon(MAX_MONTHS))
        );
    }

    #[test]
    fn negative_terms_are_rejected() {
        assert_eq!(
            project(-1.0, 5.0, 10.0),
            Err(PayoffError::InvalidTerm("principal"))
        );
        assert_eq!(
            project(100.0, -5.0, 10.0),
            Err(PayoffError::InvalidTerm("interest rate"))
        );
        assert_eq!(
            project(100.0, 5.0, f64::NAN),
            Err(PayoffError::InvalidTerm("monthly payment"))
        );
    }

    #[test]
    fn payment_larger_than_balance_takes_one_month() {
        assert_eq!(
            project(50.0, 12.0, 500.0),
            Ok(RepaymentProjection {
                months_to_payoff: 1,
                total_interest_paid: 0.5
            })
        );
    }

    #[test]
    fn projections_that_cover_interest_terminate_with_sensible_results() {
        for principal in [0.01_f64, 250.0, 1200.0, 9_999.99, 250_000.0] {
            for rate in [0.5_f64, 4.9, 12.0, 29.99] {
                let first_interest = principal * rate / 100.0 / 12.0;
                let payment = (first_interest * 1.5).max(25.0);

                match project(principal, rate, payment) {
                    Ok(projection) => {
                        assert!(projection.months_to_payoff >= 1);
                        assert!(projection.months_to_payoff <= MAX_MONTHS);
                        assert!(projection.total_interest_paid >= 0.0);
                    }
                    Err(error) => assert_eq!(error, PayoffError::ExceedsHorizon(MAX_MONTHS)),
                }
            }
        }
    }

    #[test]
    fn years_is_months_over_twelve() {
        let projection = RepaymentProjection {
            months_to_payoff: 18,
            total_interest_paid: 0.0,
        };

        assert_eq!(projection.years(), 1.5);
    }
}
