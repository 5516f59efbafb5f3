//! restartcheck CLI
//!
//! Compares simulation restart files against a baseline and exits non-zero
//! when they differ.

use clap::Parser;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "restartcheck")]
#[command(
    about = "Compare simulation restart files against a baseline",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    check: commands::check::CheckArgs,
}

fn main() {
    let cli = Cli::parse();

    match commands::check::execute(cli.check) {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
