//! `assetledger` - CLI for the asset ledger
//!
//! This binary records movements, moves them in and out of spreadsheets, and
//! hosts the interactive shell.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use assetledger::cli::{Cli, Command, ConfigCommand, MovementArgs};
use assetledger::view::{render, render_table};
use assetledger::{init_logging, shell, Config, Direction, Ledger, Session};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(path) = cli.database {
        config.storage.database_path = Some(path);
    }

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::In(args) => handle_movement(&config, Direction::Inbound, args),
        Command::Out(args) => handle_movement(&config, Direction::Outbound, args),
        Command::Import { file } => {
            let mut session = open_session(&config)?;
            session.import(&file)?;
            print_view(&session)
        }
        Command::Export { file } => {
            let mut session = open_session(&config)?;
            let status = session.export(&file)?;
            println!("[{status}]");
            Ok(())
        }
        Command::Template { file } => {
            let mut session = open_session(&config)?;
            let status = session.generate_template(&file)?;
            println!("[{status}]");
            Ok(())
        }
        Command::List(list_cmd) => {
            let session = open_session(&config)?;
            let format = list_cmd.format.unwrap_or(config.display.format);
            print!("{}", render(session.records(), session.labels(), format)?);
            Ok(())
        }
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json),
        Command::Shell => {
            let mut session = open_session(&config)?;
            let stdin = io::stdin();
            let stdout = io::stdout();
            shell::run(&mut session, &mut stdin.lock(), &mut stdout.lock())?;
            Ok(())
        }
    }
}

fn open_ledger(config: &Config) -> anyhow::Result<Ledger> {
    let path = config.database_path();
    debug!("Opening ledger at {}", path.display());
    Ok(Ledger::open(&path)?)
}

fn open_session(config: &Config) -> anyhow::Result<Session> {
    let ledger = open_ledger(config)?;
    Session::new(ledger, config.transfer.labels, config.transfer.sheet_name.clone())
        .context("failed to load the ledger")
}

fn print_view(session: &Session) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{}", render_table(session.records(), session.labels()))?;
    writeln!(stdout, "[{}]", session.status())?;
    Ok(())
}

fn handle_movement(config: &Config, direction: Direction, args: MovementArgs) -> anyhow::Result<()> {
    // Open first so a bad database path fails before anything is typed.
    let mut session = open_session(config)?;
    let form = args.into_form();
    let stdin = io::stdin();
    let stdout = io::stdout();
    session.enter(form, direction, &mut stdin.lock(), &mut stdout.lock())?;
    print_view(&session)
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let ledger = open_ledger(config)?;
    let stats = ledger.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": ledger.path(),
            "total_movements": stats.total_movements,
            "first_update": stats.first_update,
            "last_update": stats.last_update,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let format_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map_or_else(
                || "-".to_string(),
                |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
        };
        println!("assetledger status");
        println!("------------------");
        println!("Database:      {}", ledger.path().display());
        println!("Movements:     {}", stats.total_movements);
        println!("First update:  {}", format_time(stats.first_update));
        println!("Last update:   {}", format_time(stats.last_update));
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Transfer]");
                println!("  Header labels:  {}", config.transfer.labels);
                println!("  Sheet name:     {}", config.transfer.sheet_name);
                println!();
                println!("[Display]");
                println!("  List format:    {:?}", config.display.format);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
