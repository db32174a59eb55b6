use std::{error::Error, process::exit};

use clap::Parser;

use finance_tracker::{
    Config, Store,
    commands::{Command, run},
    logging::setup_logging,
};

/// Track income, expenses, savings goals and debts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(&args.config.log_level, args.config.log_file.as_deref())?;

    let store = match Store::open(&args.config.db_path) {
        Ok(store) => store,
        Err(error) => {
            print_error(format!(
                "Could not open the database at {:#?}: {error}",
                args.config.db_path
            ));
            exit(1);
        }
    };

    match run(args.command, &store, &args.config) {
        Ok(output) => println!("{output}"),
        Err(error) => {
            print_error(error);
            exit(1);
        }
    }

    Ok(())
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}
