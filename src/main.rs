//! # Plan Gate CLI
//!
//! Host binary for the plan entitlement and model selection library: decode plans,
//! browse the catalog with access status, and edit committed selections.

mod cli;
mod run;

use clap::Parser;
use dotenv::dotenv;

fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);

    // Print user-friendly message; exit uses Display not Debug
    if let Err(e) = run::run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
