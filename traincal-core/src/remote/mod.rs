//! Remote collaborators: the calendar and mailbox services, reached
//! through provider subprocesses.
//!
//! The sync drivers are written against the [`CalendarApi`] and
//! [`MailApi`] traits so tests can substitute in-memory fakes for the
//! subprocess-backed implementations.

pub mod protocol;
pub mod provider;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TraincalResult;
use crate::event::{CalendarEvent, NewEvent};
use crate::remote::protocol::{
    DeleteEvent, GetMessage, InsertEvent, ListEvents, Message, SearchMessages,
};
use crate::remote::provider::Provider;

const MAX_SEARCH_RESULTS: u32 = 100;

#[allow(async_fn_in_trait)]
pub trait CalendarApi {
    /// Events whose start falls within `[time_min, time_max]`, sorted by
    /// start time.
    async fn list(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> TraincalResult<Vec<CalendarEvent>>;

    async fn insert(&self, event: &NewEvent) -> TraincalResult<CalendarEvent>;

    async fn delete(&self, event_id: &str) -> TraincalResult<()>;
}

#[allow(async_fn_in_trait)]
pub trait MailApi {
    /// Message ids matching the service's native query syntax.
    async fn search(&self, query: &str) -> TraincalResult<Vec<String>>;

    async fn get(&self, message_id: &str) -> TraincalResult<Message>;
}

/// A calendar reached through a provider binary.
#[derive(Clone, Debug)]
pub struct RemoteCalendar {
    provider: Provider,
    calendar_id: String,
}

impl RemoteCalendar {
    pub fn new(provider: Provider, calendar_id: String) -> Self {
        RemoteCalendar {
            provider,
            calendar_id,
        }
    }
}

impl CalendarApi for RemoteCalendar {
    async fn list(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> TraincalResult<Vec<CalendarEvent>> {
        self.provider
            .call(ListEvents {
                calendar_id: self.calendar_id.clone(),
                time_min: time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
                time_max: time_max.to_rfc3339_opts(SecondsFormat::Secs, true),
            })
            .await
    }

    async fn insert(&self, event: &NewEvent) -> TraincalResult<CalendarEvent> {
        self.provider
            .call(InsertEvent {
                calendar_id: self.calendar_id.clone(),
                event: event.clone(),
            })
            .await
    }

    async fn delete(&self, event_id: &str) -> TraincalResult<()> {
        self.provider
            .call(DeleteEvent {
                calendar_id: self.calendar_id.clone(),
                event_id: event_id.to_string(),
            })
            .await
    }
}

/// A mailbox reached through a provider binary.
#[derive(Clone, Debug)]
pub struct RemoteMailbox {
    provider: Provider,
}

impl RemoteMailbox {
    pub fn new(provider: Provider) -> Self {
        RemoteMailbox { provider }
    }
}

impl MailApi for RemoteMailbox {
    async fn search(&self, query: &str) -> TraincalResult<Vec<String>> {
        self.provider
            .call(SearchMessages {
                query: query.to_string(),
                max_results: MAX_SEARCH_RESULTS,
            })
            .await
    }

    async fn get(&self, message_id: &str) -> TraincalResult<Message> {
        self.provider
            .call(GetMessage {
                message_id: message_id.to_string(),
            })
            .await
    }
}
