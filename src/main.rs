use anyhow::{Context, Result};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use user_browser::api::client::ApiClient;
use user_browser::core::config::Config;
use user_browser::core::tracing_init::init_tracing;
use user_browser::handlers::command::{self, Command, HELP};
use user_browser::handlers::render;
use user_browser::models::user::User;
use user_browser::session::controller::SessionController;
use user_browser::session::focus::spawn_focus_keeper;
use user_browser::session::state::{Notification, Snapshot, TriggerOutcome};

type Session = SessionController<ApiClient>;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let (config_path, explicit) = if args.len() > 1 {
        (PathBuf::from(&args[1]), true)
    } else {
        (PathBuf::from("config.toml"), false)
    };

    let config = Config::load_or_default(&config_path, explicit).context(format!(
        "Failed to load configuration from '{}'. \
        Copy config.example.toml to config.toml and adjust the values, or run without a file to use defaults.",
        config_path.display()
    ))?;

    init_tracing(&config.logging);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: Config) -> Result<()> {
    info!(
        base_url = %config.api.base_url,
        timeout_secs = config.api.timeout_secs,
        min_term_length = config.search.min_term_length,
        "User browser starting"
    );

    let client = ApiClient::from_config(&config.api).context("Failed to create API client")?;
    let (session, notifications) = SessionController::new(client, config.search.min_term_length);
    let session = Arc::new(session);

    let renderer = spawn_renderer(session.subscribe());
    let notifier = spawn_notifier(notifications);
    let focus = spawn_focus_keeper(Arc::clone(&session), |_: &Snapshot| print_prompt());

    session.initialize().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if !dispatch(&session, &line).await {
                    break;
                }
            }
            _ = shutdown_signal() => break,
        }
    }

    focus.abort();
    renderer.abort();
    notifier.abort();
    info!("Shutting down");

    Ok(())
}

/// Handle one input line. Returns false when the operator asked to quit.
async fn dispatch(session: &Arc<Session>, line: &str) -> bool {
    let command = match command::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => {
            print_prompt();
            return true;
        }
        Err(e) => {
            println!("{}", e);
            print_prompt();
            return true;
        }
    };

    match command {
        Command::Search(term) => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let outcome = session.submit_search(term).await;
                report(outcome, &session);
            });
        }
        Command::Type(term) => {
            session.set_pending_term(term);
            if let Some(hint) = session.snapshot().search_hint {
                println!("{}", hint);
            }
            print_prompt();
        }
        Command::Refresh => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let outcome = session.refresh().await;
                report(outcome, &session);
            });
        }
        Command::Load => {
            let session = Arc::clone(session);
            tokio::spawn(async move {
                let outcome = session.bulk_load().await;
                report(outcome, &session);
            });
        }
        Command::Sort(sort) => session.set_sort(sort),
        Command::Role(filter) => session.set_filter(filter),
        Command::Clear => session.clear_view(),
        Command::Show(id) => show_lookup(session.lookup_by_id(id).await),
        Command::Email(email) => show_lookup(session.lookup_by_email(&email).await),
        Command::Status => {
            print!("{}", render::render_snapshot(&session.snapshot()));
            print_prompt();
        }
        Command::Help => {
            println!("{}", HELP);
            print_prompt();
        }
        Command::Quit => return false,
    }

    true
}

fn report(outcome: TriggerOutcome, session: &Session) {
    if let Some(message) = render::render_outcome(outcome, &session.snapshot()) {
        println!("{}", message);
    }
}

fn show_lookup<E: std::fmt::Display>(result: std::result::Result<User, E>) {
    match result {
        Ok(user) => println!("{}", render::render_user(&user)),
        Err(e) => println!("{}", e),
    }
    print_prompt();
}

fn print_prompt() {
    print!("search> ");
    let _ = std::io::stdout().flush();
}

/// Redraw the grid whenever the visible state changes
fn spawn_renderer(mut receiver: watch::Receiver<Snapshot>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut previous = receiver.borrow_and_update().clone();
        print!("{}", render::render_snapshot(&previous));

        while receiver.changed().await.is_ok() {
            let next = receiver.borrow_and_update().clone();
            if render::should_redraw(&previous, &next) {
                println!();
                print!("{}", render::render_snapshot(&next));
                if next.controls_enabled() && !next.focus_requested {
                    print_prompt();
                }
            }
            previous = next;
        }
    })
}

fn spawn_notifier(mut notifications: mpsc::UnboundedReceiver<Notification>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            println!("{}", render::render_notification(&notification));
        }
    })
}

/// Wait for shutdown signal (Ctrl+C)
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C signal");
}
