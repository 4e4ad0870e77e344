//! Class-ingestion mode: reconcile the calendar against booking mail.
//!
//! Cancellations are processed before confirmations so a rebooked slot is
//! deleted and recreated rather than skipped as a duplicate. Window
//! fetches are run-scoped failures; everything per-message or per-event
//! is logged, counted and skipped.

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use log::{info, warn};

use crate::classify::ClassifierRules;
use crate::error::TraincalResult;
use crate::event::NewEvent;
use crate::matching::{find_cancelled, is_duplicate};
use crate::parse::{
    is_cancellation_subject, is_confirmation_subject, parse_cancellation, parse_confirmation,
};
use crate::records::{CancellationRecord, ClassRecord};
use crate::remote::{CalendarApi, MailApi};
use crate::sync::RunSummary;

/// Days either side of now searched for events a cancellation refers to.
const CANCELLATION_WINDOW_DAYS: i64 = 180;

/// Search filters in the mail service's native query syntax. The booking
/// platform is MindBody, so the defaults pin its sender and subjects.
#[derive(Debug, Clone)]
pub struct MailQueries {
    pub confirmations: String,
    pub cancellations: String,
}

impl Default for MailQueries {
    fn default() -> Self {
        MailQueries {
            confirmations: "from:mindbodyonline.com subject:\"you're CONFIRMED\"".to_string(),
            cancellations:
                "from:mindbodyonline.com subject:\"Your class reservation has been canceled\""
                    .to_string(),
        }
    }
}

pub struct IngestOutcome {
    pub summary: RunSummary,
    pub confirmations_found: usize,
    pub cancellations_found: usize,
}

pub async fn run<C: CalendarApi, M: MailApi>(
    calendar: &C,
    mailbox: &M,
    rules: &ClassifierRules,
    tz: Tz,
    queries: &MailQueries,
    days_back: i64,
    dry_run: bool,
) -> TraincalResult<IngestOutcome> {
    let mut summary = RunSummary::default();
    let cutoff = Utc::now() - Duration::days(days_back);
    let after = cutoff.format("%Y/%m/%d");

    let cancellations = fetch_cancellations(
        mailbox,
        &format!("{} after:{after}", queries.cancellations),
        tz,
        &mut summary,
    )
    .await?;
    info!("found {} cancellations", cancellations.len());
    process_cancellations(calendar, &cancellations, dry_run, &mut summary).await?;

    let confirmations = fetch_confirmations(
        mailbox,
        &format!("{} after:{after}", queries.confirmations),
        tz,
        &mut summary,
    )
    .await?;
    info!("found {} confirmed classes", confirmations.len());
    process_confirmations(calendar, &confirmations, rules, dry_run, &mut summary).await?;

    Ok(IngestOutcome {
        summary,
        confirmations_found: confirmations.len(),
        cancellations_found: cancellations.len(),
    })
}

async fn fetch_cancellations<M: MailApi>(
    mailbox: &M,
    query: &str,
    tz: Tz,
    summary: &mut RunSummary,
) -> TraincalResult<Vec<CancellationRecord>> {
    let mut records = Vec::new();
    for id in mailbox.search(query).await? {
        let message = match mailbox.get(&id).await {
            Ok(m) => m,
            Err(e) => {
                warn!("failed to fetch message {id}: {e}");
                summary.errors += 1;
                continue;
            }
        };
        if !is_cancellation_subject(&message.subject) {
            continue;
        }
        match parse_cancellation(&message.body, tz) {
            Ok(record) => records.push(record),
            Err(e) => warn!("dropping unparseable cancellation {id}: {e}"),
        }
    }
    Ok(records)
}

async fn fetch_confirmations<M: MailApi>(
    mailbox: &M,
    query: &str,
    tz: Tz,
    summary: &mut RunSummary,
) -> TraincalResult<Vec<ClassRecord>> {
    let mut records = Vec::new();
    for id in mailbox.search(query).await? {
        let message = match mailbox.get(&id).await {
            Ok(m) => m,
            Err(e) => {
                warn!("failed to fetch message {id}: {e}");
                summary.errors += 1;
                continue;
            }
        };
        if !is_confirmation_subject(&message.subject) {
            continue;
        }
        match parse_confirmation(&message.subject, &message.body, tz) {
            Ok(record) => records.push(record),
            Err(e) => warn!("dropping unparseable confirmation {id}: {e}"),
        }
    }
    Ok(records)
}

async fn process_cancellations<C: CalendarApi>(
    calendar: &C,
    cancellations: &[CancellationRecord],
    dry_run: bool,
    summary: &mut RunSummary,
) -> TraincalResult<()> {
    if cancellations.is_empty() {
        return Ok(());
    }

    let now = Utc::now();
    let events = calendar
        .list(
            now - Duration::days(CANCELLATION_WINDOW_DAYS),
            now + Duration::days(CANCELLATION_WINDOW_DAYS),
        )
        .await?;

    for cancellation in cancellations {
        let matches = find_cancelled(cancellation, &events);
        if matches.is_empty() {
            warn!(
                "no event matches cancellation {} {} at {}",
                cancellation.date, cancellation.time, cancellation.location
            );
            summary.not_found += 1;
            continue;
        }
        for event in matches {
            if dry_run {
                summary.deleted += 1;
                continue;
            }
            match calendar.delete(&event.id).await {
                Ok(()) => {
                    info!("deleted cancelled class '{}'", event.summary);
                    summary.deleted += 1;
                }
                Err(crate::error::TraincalError::NotFound(_)) => summary.not_found += 1,
                Err(e) => {
                    warn!("failed to delete '{}' ({}): {e}", event.summary, event.id);
                    summary.errors += 1;
                }
            }
        }
    }
    Ok(())
}

async fn process_confirmations<C: CalendarApi>(
    calendar: &C,
    confirmations: &[ClassRecord],
    rules: &ClassifierRules,
    dry_run: bool,
    summary: &mut RunSummary,
) -> TraincalResult<()> {
    if confirmations.is_empty() {
        return Ok(());
    }

    // One window covering every candidate keeps this to a single fetch.
    let min_start = confirmations
        .iter()
        .map(|r| r.start.with_timezone(&Utc))
        .min()
        .unwrap_or_else(Utc::now);
    let max_start = confirmations
        .iter()
        .map(|r| r.start.with_timezone(&Utc))
        .max()
        .unwrap_or_else(Utc::now);
    let existing = calendar
        .list(min_start, max_start + Duration::days(1))
        .await?;

    for record in confirmations {
        if is_duplicate(record, &existing, rules) {
            info!("skipping duplicate '{}' at {}", record.title, record.start);
            summary.duplicates += 1;
            continue;
        }
        let event = NewEvent {
            summary: record.title.clone(),
            description: Some(record.description.clone()),
            location: Some(record.location.clone()),
            start: record.start.with_timezone(&Utc),
            end: record.end.with_timezone(&Utc),
        };
        if dry_run {
            summary.created += 1;
            continue;
        }
        match calendar.insert(&event).await {
            Ok(created) => {
                info!("created class '{}' at {}", created.summary, record.start);
                summary.created += 1;
            }
            Err(e) => {
                warn!("failed to create '{}': {e}", event.summary);
                summary.errors += 1;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::protocol::Message;
    use crate::testutil::{timed_event, FakeCalendar, FakeMailbox};
    use chrono::{DateTime, NaiveDate, TimeZone};
    use chrono_tz::America::New_York;

    // Message bodies are generated near "now" so they land inside the
    // search and matching windows no matter when the tests run.
    fn upcoming_class_start() -> DateTime<Tz> {
        let date = (Utc::now() + Duration::days(3))
            .with_timezone(&New_York)
            .date_naive();
        New_York
            .from_local_datetime(&date.and_hms_opt(8, 0, 0).unwrap())
            .unwrap()
    }

    fn confirmation_message(id: &str, start: DateTime<Tz>) -> Message {
        Message {
            id: id.to_string(),
            subject: "you're CONFIRMED".to_string(),
            body: format!(
                "you're CONFIRMED Signature50: Full Body {}",
                start.format("%I:%M %p, %A, %m/%d/%Y")
            ),
        }
    }

    fn cancellation_message(id: &str, start: DateTime<Tz>, location: &str) -> Message {
        Message {
            id: id.to_string(),
            subject: "Your class reservation has been canceled".to_string(),
            body: format!(
                "Your class reservation on {} at {} under the blue lights of {} has been canceled.",
                start.format("%m/%d/%Y"),
                start.format("%I:%M %p"),
                location
            ),
        }
    }

    #[tokio::test]
    async fn confirmation_creates_then_dedupes() {
        let start = upcoming_class_start();
        let mailbox = FakeMailbox {
            messages: vec![confirmation_message("m1", start)],
        };
        let calendar = FakeCalendar::default();
        let queries = MailQueries::default();

        let first = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &queries,
            30,
            false,
        )
        .await
        .unwrap();
        assert_eq!(first.summary.created, 1);
        assert_eq!(first.confirmations_found, 1);
        assert_eq!(calendar.summaries(), vec!["Signature50: Full Body"]);

        let second = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &queries,
            30,
            false,
        )
        .await
        .unwrap();
        assert_eq!(second.summary.created, 0);
        assert_eq!(second.summary.duplicates, 1);
        assert_eq!(calendar.events.borrow().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_deletes_every_match_and_counts_misses() {
        let start = upcoming_class_start();
        let start_utc = start.with_timezone(&Utc);
        let mut class = timed_event("c1", "Signature50: Full Body", start_utc, 50);
        class.location = Some("[solidcore] Burlington".to_string());
        let mut hold = timed_event("c2", "Class hold", start_utc, 50);
        hold.location = Some("Burlington".to_string());
        let calendar = FakeCalendar::with_events(vec![class, hold]);

        let missed = New_York
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2025, 1, 5)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
            )
            .unwrap();
        let mailbox = FakeMailbox {
            messages: vec![
                cancellation_message("m1", start, "Burlington"),
                cancellation_message("m2", missed, "Back Bay"),
            ],
        };

        let outcome = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &MailQueries::default(),
            30,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome.cancellations_found, 2);
        assert_eq!(outcome.summary.deleted, 2);
        assert_eq!(outcome.summary.not_found, 1);
        assert!(calendar.events.borrow().is_empty());
    }

    #[tokio::test]
    async fn cancellations_run_before_confirmations() {
        // A rebooked slot: the old event is cancelled and a confirmation
        // for the same title and time arrives in the same batch. Ordering
        // means delete first, then create fresh instead of deduping.
        let start = upcoming_class_start();
        let start_utc = start.with_timezone(&Utc);
        let mut old = timed_event("old", "Signature50: Full Body", start_utc, 50);
        old.location = Some("Burlington".to_string());
        let calendar = FakeCalendar::with_events(vec![old]);
        let mailbox = FakeMailbox {
            messages: vec![
                confirmation_message("m1", start),
                cancellation_message("m2", start, "Burlington"),
            ],
        };

        let outcome = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &MailQueries::default(),
            30,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome.summary.deleted, 1);
        assert_eq!(outcome.summary.created, 1);
        assert_eq!(outcome.summary.duplicates, 0);
        assert_eq!(calendar.events.borrow().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_counts_without_touching_anything() {
        let start = upcoming_class_start();
        let mailbox = FakeMailbox {
            messages: vec![confirmation_message("m1", start)],
        };
        let calendar = FakeCalendar::default();

        let outcome = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &MailQueries::default(),
            30,
            true,
        )
        .await
        .unwrap();

        assert_eq!(outcome.summary.created, 1);
        assert!(calendar.events.borrow().is_empty());
    }

    #[tokio::test]
    async fn unparseable_messages_drop_without_erroring() {
        let mailbox = FakeMailbox {
            messages: vec![Message {
                id: "m1".to_string(),
                subject: "you're CONFIRMED".to_string(),
                body: "see you in class!".to_string(),
            }],
        };
        let calendar = FakeCalendar::default();

        let outcome = run(
            &calendar,
            &mailbox,
            &ClassifierRules::default(),
            New_York,
            &MailQueries::default(),
            30,
            false,
        )
        .await
        .unwrap();

        assert_eq!(outcome.confirmations_found, 0);
        assert_eq!(outcome.summary.errors, 0);
        assert_eq!(outcome.summary.created, 0);
    }
}
