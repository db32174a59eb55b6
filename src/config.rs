//! Settings shared by every command, read from the command line or the environment.

use std::path::PathBuf;

use clap::Args;
use time::Date;

use crate::{Currency, Error, timezone};

/// Where the data lives and how results are presented.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(
        long,
        env = "FINANCE_DB_PATH",
        default_value = "finance_app.db",
        global = true
    )]
    pub db_path: PathBuf,

    /// The currency amounts are displayed in.
    #[arg(
        long,
        env = "FINANCE_CURRENCY",
        value_enum,
        default_value = "eur",
        ignore_case = true,
        global = true
    )]
    pub currency: Currency,

    /// Canonical name of the timezone used to date new entries, e.g. "Pacific/Auckland".
    #[arg(long, env = "FINANCE_TIMEZONE", default_value = "Etc/UTC", global = true)]
    pub timezone: String,

    /// The default log filter, e.g. "debug". `RUST_LOG` takes precedence when set.
    #[arg(long, env = "FINANCE_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Append debug logs to this file.
    #[arg(long, env = "FINANCE_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

impl Config {
    /// Today's date in the configured timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the timezone name is not recognised.
    pub fn today(&self) -> Result<Date, Error> {
        timezone::today(&self.timezone)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("finance_app.db"),
            currency: Currency::default(),
            timezone: "Etc/UTC".to_owned(),
            log_level: "warn".to_owned(),
            log_file: None,
            json: false,
        }
    }
}
