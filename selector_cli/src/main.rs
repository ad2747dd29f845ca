//! # Shaft Selector CLI
//!
//! Line-oriented front end for the connection form. Every command goes
//! through a [`FormSession`], so the terminal sees exactly the behavior a
//! graphical form would: derived hub length, live diagnostics and the
//! submission gate.
//!
//! Usage: `selector_cli [config.toml]` (defaults to `selector.toml` in the
//! working directory; a missing file is fine). `RUST_LOG` controls logging.

mod commands;
mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use selector_core::config::SelectorConfig;
use selector_core::service::HttpConnectionService;
use selector_core::session::FormSession;
use selector_core::snapshot::{load_snapshot, save_snapshot};
use tracing_subscriber::EnvFilter;

use commands::{parse_command, Command, HELP};

const DEFAULT_CONFIG_FILE: &str = "selector.toml";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = match SelectorConfig::load(Some(&config_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(api = %config.api_base_url, "using selection service");

    let service = match HttpConnectionService::new(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Shaft Selector - Shaft-Hub Connection Form");
    println!("==========================================");
    println!("Type 'help' for commands.");
    println!();

    let mut session = FormSession::new();
    session.load_materials(&service).await;
    render::print_form(&session);

    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let command = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::Show => render::print_form(&session),
            Command::Set { field, text } => {
                let before = session.fields().clone();
                session.edit_text(field, &text);
                if session.fields() == &before && !text.is_empty() {
                    println!("'{}' ignored for {}", text, field.display_name());
                }
                render::print_diagnostics(session.diagnostics());
            }
            Command::Pref { key, value } => {
                session.set_preference(key, value);
                if session.fields().user_preferences.get(key) != value {
                    println!("{} ignored: weights range from 0 to 1", value);
                }
                println!("{} = {:.2}", key.display_name(), session.fields().user_preferences.get(key));
            }
            Command::Commit(field) => {
                session.commit_field(field);
                println!("{} = {}", field.display_name(), session.fields().display_value(field));
            }
            Command::Check => render::print_diagnostics(session.diagnostics()),
            Command::Submit => {
                println!("Calculating...");
                match session.submit(&service).await {
                    Ok(summary) => render::print_summary(&summary),
                    Err(e) => {
                        println!("[ERROR] {}", e.banner_message());
                        if !session.diagnostics().is_empty() {
                            render::print_diagnostics(session.diagnostics());
                        }
                    }
                }
            }
            Command::Result => match session.summary() {
                Some(summary) => render::print_summary(&summary),
                None => println!("No result yet."),
            },
            Command::Materials => {
                session.load_materials(&service).await;
                match session.materials_warning() {
                    Some(warning) => println!("{}", warning),
                    None => println!("Materials: {}", session.materials().join(", ")),
                }
            }
            Command::Reset => {
                session.reset();
                render::print_form(&session);
            }
            Command::Save(path) => match save_snapshot(&session.snapshot(), &path) {
                Ok(()) => println!("Saved to {}", path.display()),
                Err(e) => println!("Error: {}", e),
            },
            Command::Load(path) => match load_snapshot(&path) {
                Ok(snapshot) => {
                    session.restore(snapshot);
                    render::print_form(&session);
                }
                Err(e) => println!("Error: {}", e),
            },
            Command::Json => match session.result() {
                Some(result) => match serde_json::to_string_pretty(result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("No result yet."),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    session.close();
}
