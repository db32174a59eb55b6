//! Validation and rounding of monetary amounts.
//!
//! Amounts are stored as `f64` but are always rounded to the currency's minor
//! unit (cents) when they cross the store boundary. Calculations that must be
//! exact, such as the repayment simulation, work in integer cents.

/// Why a value was rejected before reaching the database.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The named field was NaN or infinite.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// The named field was below zero.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// The named field was zero or below where a strictly positive amount is required.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// The named field was larger than [MAX_AMOUNT].
    #[error("{0} must not be more than 10 trillion")]
    TooLarge(&'static str),

    /// A label such as a category or debt name was empty or only whitespace.
    #[error("{0} cannot be empty")]
    EmptyLabel(&'static str),

    /// A value from the command line could not be parsed.
    #[error("could not parse {field} from \"{value}\"")]
    Unparsable {
        /// The field being parsed.
        field: &'static str,
        /// The text that failed to parse.
        value: String,
    },
}

/// Number of minor units in one major unit of currency.
pub const CENTS_PER_UNIT: f64 = 100.0;

/// The largest amount accepted for storage.
///
/// Every amount up to this converts to cents exactly, and totals over many
/// such amounts still fit in the accumulators used for summing.
pub const MAX_AMOUNT: f64 = 1e13;

/// Convert an amount to whole cents, rounding half away from zero.
pub fn to_cents(amount: f64) -> i64 {
    (amount * CENTS_PER_UNIT).round() as i64
}

/// Convert whole cents back to an amount.
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / CENTS_PER_UNIT
}

/// Round an amount to the nearest cent.
pub fn round_to_cents(amount: f64) -> f64 {
    from_cents(to_cents(amount))
}

/// Check that `amount` is a finite, non-negative number and round it to cents.
///
/// # Errors
///
/// Returns [ValidationError::NotFinite], [ValidationError::Negative] or
/// [ValidationError::TooLarge] naming `field`.
pub fn validate_amount(field: &'static str, amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }

    if amount < 0.0 {
        return Err(ValidationError::Negative(field));
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge(field));
    }

    // Avoids storing -0.0 for tiny negative inputs that round to zero.
    Ok(round_to_cents(amount).max(0.0))
}

/// Check that `amount` is a finite number of at least one cent and round it to cents.
///
/// # Errors
///
/// Returns [ValidationError::NotFinite], [ValidationError::NotPositive] or
/// [ValidationError::TooLarge] naming `field`.
pub fn validate_positive_amount(field: &'static str, amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge(field));
    }

    let rounded = round_to_cents(amount);

    if rounded <= 0.0 {
        return Err(ValidationError::NotPositive(field));
    }

    Ok(rounded)
}

/// Check that an annual interest rate, given as a percentage, is usable.
pub fn validate_rate(field: &'static str, rate: f64) -> Result<f64, ValidationError> {
    if !rate.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }

    if rate < 0.0 {
        return Err(ValidationError::Negative(field));
    }

    Ok(rate)
}
