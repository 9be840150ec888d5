use clap::Parser;
use std::process;
use tablecrud::cli::{Cli, Commands};
use tablecrud::cli_handlers;
use tablecrud::db::DbPath;
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let db = DbPath::new(&cli.db);

    match cli.command {
        Commands::Init => cli_handlers::handle_init(&db)?,
        Commands::Tables { json } => cli_handlers::handle_tables(&db, json)?,
        Commands::Show { table, json } => cli_handlers::handle_show(&db, &table, json)?,
        Commands::Add { table, set } => cli_handlers::handle_add(&db, &table, &set)?,
        Commands::Update { table, row, set } => {
            cli_handlers::handle_update(&db, &table, row, &set)?
        }
        Commands::Delete { table, row } => cli_handlers::handle_delete(&db, &table, row)?,
        Commands::Shell => cli_handlers::handle_shell(&db)?,
    }
    Ok(())
}
