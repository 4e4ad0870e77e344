//! Defines the JSON protocol used for communication between the CLI
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::event::{CalendarEvent, NewEvent};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Authenticate,
    ListEvents,
    InsertEvent,
    DeleteEvent,
    SearchMessages,
    GetMessage,
}

/// Request sent from CLI to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to CLI.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap()
    }
}

impl Response<()> {
    pub fn error(msg: &str) -> String {
        serde_json::to_string(&Response::<()>::Error {
            error: msg.to_string(),
        })
        .unwrap()
    }
}

/// Run the provider's interactive authentication flow.
#[derive(Debug, Serialize, Deserialize)]
pub struct Authenticate {}

impl ProviderCommand for Authenticate {
    type Response = String; // Account identifier (e.g., email)
    fn command() -> Command {
        Command::Authenticate
    }
}

/// List events within a time range, RFC 3339 bounds.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListEvents {
    pub calendar_id: String,
    pub time_min: String,
    pub time_max: String,
}

impl ProviderCommand for ListEvents {
    type Response = Vec<CalendarEvent>;
    fn command() -> Command {
        Command::ListEvents
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertEvent {
    pub calendar_id: String,
    pub event: NewEvent,
}

impl ProviderCommand for InsertEvent {
    type Response = CalendarEvent;
    fn command() -> Command {
        Command::InsertEvent
    }
}

/// Delete an event by ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    pub calendar_id: String,
    pub event_id: String,
}

impl ProviderCommand for DeleteEvent {
    type Response = ();
    fn command() -> Command {
        Command::DeleteEvent
    }
}

/// Search the mailbox; returns matching message ids, newest first.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchMessages {
    pub query: String,
    pub max_results: u32,
}

impl ProviderCommand for SearchMessages {
    type Response = Vec<String>;
    fn command() -> Command {
        Command::SearchMessages
    }
}

/// Fetch one message with its decoded plain-text body.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetMessage {
    pub message_id: String,
}

impl ProviderCommand for GetMessage {
    type Response = Message;
    fn command() -> Command {
        Command::GetMessage
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: String,
    pub body: String,
}
