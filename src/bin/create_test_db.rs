use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use time::{Date, Duration};

use finance_tracker::{
    Label, NewRecord, Store,
    debt::NewDebt,
    expense::{NewExpense, PaymentMethod},
    income::NewIncome,
    savings::NewSavingsGoal,
    timezone,
};

/// A utility for creating a test database for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Canonical timezone used to date the sample records.
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let today = timezone::today(&args.timezone)?;

    println!("Creating database at {output_path:#?}");
    let store = Store::open(output_path)?;

    println!("Creating test records...");
    for record in sample_records(today) {
        store.create(record)?;
    }

    println!("Success!");

    Ok(())
}

fn sample_records(today: Date) -> Vec<NewRecord> {
    let mut records = Vec::new();

    for months_ago in 0..3 {
        let date = today - Duration::days(30 * months_ago);

        records.push(NewRecord::Income(NewIncome {
            source: "Employer".to_owned(),
            amount: 3200.0,
            category: Label::new_unchecked("Salary"),
            date,
        }));
        records.push(NewRecord::Expense(NewExpense {
            amount: 1250.0,
            category: Label::new_unchecked("Rent"),
            payment_method: PaymentMethod::Other,
            date,
        }));
        records.push(NewRecord::Expense(NewExpense {
            amount: 412.37,
            category: Label::new_unchecked("Groceries"),
            payment_method: PaymentMethod::DebitCard,
            date,
        }));
        records.push(NewRecord::Expense(NewExpense {
            amount: 64.99,
            category: Label::new_unchecked("Utilities"),
            payment_method: PaymentMethod::CreditCard,
            date,
        }));
    }

    records.push(NewRecord::Income(NewIncome {
        source: "Client".to_owned(),
        amount: 850.0,
        category: Label::new_unchecked("Freelance"),
        date: today,
    }));
    records.push(NewRecord::Savings(NewSavingsGoal {
        name: Label::new_unchecked("Emergency fund"),
        target_amount: 10_000.0,
        saved_amount: 2500.0,
        monthly_contribution: 300.0,
        date: today,
    }));
    records.push(NewRecord::Debt(NewDebt {
        name: Label::new_unchecked("Credit card"),
        principal: 2400.0,
        annual_rate: 19.99,
        minimum_payment: 75.0,
    }));
    records.push(NewRecord::Debt(NewDebt {
        name: Label::new_unchecked("Car loan"),
        principal: 9500.0,
        annual_rate: 6.5,
        minimum_payment: 220.0,
    }));

    records
}
