pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "listwise",
    about = "Listwise operator CLI",
    long_about = "Inspect configuration and reference data, and run the shopping-list engines \
                  against list files without starting the HTTP server.",
    after_help = "Examples:\n  listwise doctor --json\n  listwise stock WMK_P001 --store S002\n  \
                  listwise price list.json\n  listwise route list.json --start FRONT_DOOR"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Check configuration and reference data readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Report the stock status of one product at a store")]
    Stock {
        product_id: String,
        #[arg(long, help = "Store id (defaults to the configured store)")]
        store: Option<String>,
    },
    #[command(about = "Annotate a list file with stock and substitutes, then apply deals")]
    Price {
        list: PathBuf,
        #[arg(long, help = "Store id (defaults to the configured store)")]
        store: Option<String>,
    },
    #[command(about = "Plan a pickup route for a list file")]
    Route {
        list: PathBuf,
        #[arg(long, help = "Start node (defaults to the layout entry point)")]
        start: Option<String>,
    },
    #[command(about = "Decrement inventory for a list file and persist the result")]
    Fulfill {
        list: PathBuf,
        #[arg(long, help = "Store id (defaults to the configured store)")]
        store: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => commands::CommandResult::plain(commands::config::run()),
        Command::Stock { product_id, store } => {
            commands::stock::run(&product_id, store.as_deref())
        }
        Command::Price { list, store } => commands::price::run(&list, store.as_deref()),
        Command::Route { list, start } => commands::route::run(&list, start.as_deref()),
        Command::Fulfill { list, store } => commands::fulfill::run(&list, store.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
