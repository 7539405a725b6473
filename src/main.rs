use chrono::Local;
use clap::Parser;
use expense_ledger::args::{Args, Command};
use expense_ledger::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with {} error: {e}", e.error_type());
            ExitCode::FAILURE
        }
    }
}

pub fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => commands::init(
            home,
            init_args.backup_copies(),
            init_args.data_file(),
            init_args.on_corrupt(),
        )?
        .print(),

        Command::Add(add_args) => commands::add(Config::load(home)?, add_args.clone())?.print(),

        Command::Update(update_args) => {
            commands::update(Config::load(home)?, update_args.clone())?.print()
        }

        Command::Delete(id_args) => commands::delete(Config::load(home)?, id_args.id())?.print(),

        Command::Show(id_args) => commands::show(Config::load(home)?, id_args.id())?.print(),

        Command::List(list_args) => {
            commands::list(Config::load(home)?, list_args.query()?)?.print()
        }

        Command::Summary(filter_args) => {
            let today = Local::now().date_naive();
            commands::summary(Config::load(home)?, filter_args.query(true)?, today)?.print()
        }

        Command::Export(export_args) => commands::export(
            Config::load(home)?,
            export_args.query()?,
            export_args.output(),
        )?
        .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "expense_ledger={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
