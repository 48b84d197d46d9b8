//! photodedupe - duplicate photo and media finder
//!
//! Entry point for the photodedupe CLI application.

use clap::Parser;
use photodedupe::{
    cli::{Cli, OutputFormat},
    error::ExitCode,
};

fn main() {
    let cli = Cli::parse();

    match photodedupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::GeneralError;

            if err.output == OutputFormat::Json {
                match serde_json::to_string_pretty(&err.structured(exit_code)) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
