//! CLI smoke entry point.
//!
//! Loads `BOOKSHELF_*` configuration, opens the store and prints the book
//! listing in wire format. Exits non-zero when the store cannot be opened.

use bookshelf_core::{BookRepository, SqliteBookRepository, StoreConfig};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bookshelf_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env();
    config.init_logging()?;

    println!("bookshelf_core version={}", bookshelf_core::core_version());
    match &config.db_path {
        Some(path) => println!("store={}", path.display()),
        None => println!("store=memory"),
    }

    let conn = config.open()?;
    let books = SqliteBookRepository::try_new(&conn)?.list_books()?;
    info!("event=cli_list module=cli status=ok books={}", books.len());
    println!("{}", serde_json::to_string_pretty(&books)?);
    Ok(())
}
