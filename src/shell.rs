//! Line-oriented host for the backend: commands are read from stdin and
//! backend events are printed as they arrive.

use std::{
    io::{self, BufRead, Write},
    sync::Arc,
    thread,
};

use anyhow::Context;
use floorwatch_bridge::{
    MessageFromBackend, MessageToBackend,
    notification::{NotificationRecord, RawEventPayload},
};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::console::ConsoleHost;

const HELP: &str = "\
commands:
  connect <url>          open the event stream
  disconnect             close the event stream
  show <id>              print one notification
  read <id> | read-all   mark notifications as read
  remove <id> | clear    delete notifications
  unread                 print the unread count
  simulate [json]        inject a notification, e.g. simulate {\"title\":\"Hi\",\"message\":\"There\"}
  push <title> | <body>  deliver a foreground push notification
  open <id>              tap or click a delivered notification
  permission             ask for notification permission
  config                 print the configuration
  help | quit";

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid notification payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[derive(Debug)]
pub enum Command {
    Send(MessageToBackend),
    /// Activates a notification shown by the console host.
    Open(String),
    Help,
    Quit,
}

fn required<'a>(argument: &'a str, name: &'static str) -> Result<&'a str, CommandError> {
    if argument.is_empty() {
        Err(CommandError::MissingArgument(name))
    } else {
        Ok(argument)
    }
}

/// Parses one input line. Empty lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, argument) = line
        .split_once(char::is_whitespace)
        .map(|(name, argument)| (name, argument.trim()))
        .unwrap_or((line, ""));

    let message = match name {
        "help" => return Ok(Some(Command::Help)),
        "quit" | "exit" => return Ok(Some(Command::Quit)),
        "open" => return Ok(Some(Command::Open(required(argument, "id")?.to_string()))),
        "connect" => MessageToBackend::Connect(required(argument, "url")?.to_string()),
        "disconnect" => MessageToBackend::Disconnect,
        "show" => MessageToBackend::NotificationRequest(required(argument, "id")?.to_string()),
        "read" => MessageToBackend::MarkAsRead(required(argument, "id")?.to_string()),
        "read-all" => MessageToBackend::MarkAllAsRead,
        "remove" => MessageToBackend::RemoveNotification(required(argument, "id")?.to_string()),
        "clear" => MessageToBackend::ClearAll,
        "unread" => MessageToBackend::UnreadCountRequest,
        "permission" => MessageToBackend::PermissionRequest,
        "config" => MessageToBackend::ConfigurationRequest,
        "simulate" if argument.is_empty() => {
            MessageToBackend::SimulateNotification(RawEventPayload::default())
        }
        "simulate" => MessageToBackend::SimulateNotification(serde_json::from_str(argument)?),
        "push" => {
            let (title, body) = argument
                .split_once('|')
                .ok_or(CommandError::MissingArgument("`<title> | <body>`"))?;
            MessageToBackend::PushReceived {
                title: title.trim().to_string(),
                body: body.trim().to_string(),
            }
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(Command::Send(message)))
}

fn print_record(record: &NotificationRecord) {
    println!(
        "  {} {:<8} {:<12} {} - {} ({}, {})",
        if record.read { " " } else { "*" },
        record.notification_type.as_str(),
        record.id,
        record.title,
        record.message,
        record.date,
        record.time,
    );
}

fn print_backend_message(message: MessageFromBackend) {
    match message {
        MessageFromBackend::NotificationsUpdated(records) => {
            println!("notifications ({}):", records.len());
            records.iter().for_each(print_record);
        }
        MessageFromBackend::ConnectionUpdated(state) => {
            let status = if state.connected { "connected" } else { "disconnected" };
            println!(
                "stream {status} ({}), reconnect attempts: {}",
                if state.url.is_empty() { "no url" } else { state.url.as_str() },
                state.reconnect_attempts
            );
        }
        MessageFromBackend::NotificationResponse(Some(record)) => {
            print_record(&record);
            if let Some(details) = &record.details {
                println!("    {details}");
            }
            for info in record.related_info.iter().flatten() {
                println!("    {}: {}", info.label, info.value);
            }
        }
        MessageFromBackend::NotificationResponse(None) => println!("no such notification"),
        MessageFromBackend::UnreadCountResponse(count) => println!("{count} unread"),
        MessageFromBackend::ConfigurationResponse(config) => println!("{config:#?}"),
        MessageFromBackend::PermissionResponse(granted) => {
            println!("permission {}", if granted { "granted" } else { "denied" });
        }
        MessageFromBackend::NavigationRequest(route) => println!("-> navigate to {route}"),
    }
}

/// Runs the shell until stdin is exhausted or the user quits.
pub fn run(
    mut rx: Receiver<MessageFromBackend>,
    tx: Sender<MessageToBackend>,
    host: Arc<ConsoleHost>,
) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("floorwatch-printer".to_string())
        .spawn(move || {
            while let Some(message) = rx.blocking_recv() {
                log::debug!("Got a message from backend: {message:?}");
                print_backend_message(message);
            }
        })
        .context("failed to spawn the printer thread")?;

    println!("{HELP}");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match parse_command(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => println!("{HELP}"),
            Ok(Some(Command::Open(id))) => {
                if !host.activate(&id) {
                    println!("notification {id} is not on screen");
                }
            }
            Ok(Some(Command::Send(message))) => tx
                .blocking_send(message)
                .context("backend is no longer running")?,
            Err(error) => println!("{error}"),
        }
        io::stdout().flush()?;
    }

    Ok(())
}
