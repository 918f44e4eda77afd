//! Interactive mode: reads commands from stdin and re-renders the session
//! whenever a query starts, finishes or fails.

use std::sync::Arc;

use anyhow::{Context, Result};
use client_core::{QueryController, SessionEvent};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, warn};

use crate::view;

const HELP: &str = concat!(
    "Enter a location id to load it. ",
    "Commands: n/next, p/prev, page <N>, r/show, h/help, q/quit."
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load(String),
    Next,
    Previous,
    Page(usize),
    Show,
    Help,
    Quit,
    Invalid(String),
}

/// Returns `None` for blank lines. Anything that is not a command is taken
/// as a location identifier.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let command = match head.as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Previous,
        "r" | "show" => Command::Show,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "page" => match parts.next().map(str::parse::<usize>) {
            Some(Ok(page)) => Command::Page(page),
            _ => Command::Invalid(format!("expected a page number: '{line}'")),
        },
        _ => Command::Load(line.to_string()),
    };
    Some(command)
}

pub async fn run(controller: Arc<QueryController>, initial: Option<String>) -> Result<()> {
    let mut events = controller.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    match initial {
        Some(identifier) => controller.spawn_submit(identifier).await,
        None => show(&controller).await,
    }

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                let Some(command) = parse_command(&line) else {
                    continue;
                };
                debug!(?command, "interactive command");
                match command {
                    Command::Quit => break,
                    Command::Load(identifier) => controller.spawn_submit(identifier).await,
                    Command::Next => {
                        controller.next_page().await;
                        show(&controller).await;
                    }
                    Command::Previous => {
                        controller.previous_page().await;
                        show(&controller).await;
                    }
                    Command::Page(page) => {
                        controller.go_to_page(page).await;
                        show(&controller).await;
                    }
                    Command::Show => show(&controller).await,
                    Command::Help => println!("{HELP}"),
                    Command::Invalid(message) => println!("{message}"),
                }
            }
            event = events.recv() => match event {
                Ok(
                    SessionEvent::LoadStarted { .. }
                    | SessionEvent::LoadFinished { .. }
                    | SessionEvent::LoadFailed { .. },
                ) => show(&controller).await,
                Ok(SessionEvent::StaleDiscarded { .. } | SessionEvent::PageChanged { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "session event receiver lagged");
                    show(&controller).await;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

async fn show(controller: &QueryController) {
    print!("\n{}", view::render(&controller.snapshot().await));
}
