//! Task that drives one aggregation.
//!
//! Partial results and the deadline signal share a single unbounded channel.
//! The deadline timer is a separate task that sends `DeadlineExpired` into
//! that channel, so the aggregator sees every event in arrival order and
//! exactly one of them completes it.

use super::reply::ReplyTarget;
use super::state::{Aggregation, AggregatorEvent};
use super::AggregationRequest;
use crate::models::Outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, info_span, trace, warn, Instrument};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Stand-in for deadlines too large to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Sending side of a running aggregator.
///
/// Cheap to clone; hand one to every worker contributing a result. Sends to
/// an aggregator that already completed are dropped.
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    id: u64,
    events: mpsc::UnboundedSender<AggregatorEvent>,
}

impl AggregatorHandle {
    /// Identifier used in log spans.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Delivers one partial result.
    pub fn submit(&self, value: i64) {
        self.send(AggregatorEvent::PartialResult(value));
    }

    /// Delivers the deadline signal now instead of waiting for the timer.
    pub fn expire(&self) {
        self.send(AggregatorEvent::DeadlineExpired);
    }

    /// Returns true once the aggregator has stopped accepting events.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    fn send(&self, event: AggregatorEvent) {
        if self.events.send(event).is_err() {
            trace!(
                request = self.id,
                ?event,
                "Aggregator already completed, dropping event"
            );
        }
    }
}

/// One-shot timer that injects `DeadlineExpired` into the event channel.
/// Dropping it cancels the timer.
struct DeadlineTimer {
    task: JoinHandle<()>,
}

impl DeadlineTimer {
    fn arm(deadline: Duration, events: mpsc::UnboundedSender<AggregatorEvent>) -> Self {
        let now = Instant::now();
        let fire_at = now
            .checked_add(deadline)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let task = tokio::spawn(async move {
            time::sleep_until(fire_at).await;
            let _ = events.send(AggregatorEvent::DeadlineExpired);
        });
        Self { task }
    }
}

impl Drop for DeadlineTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts an aggregator for `request` on the current tokio runtime.
///
/// The deadline is armed immediately and is never pushed back by incoming
/// results. The returned task finishes right after the outcome is sent to
/// the request's reply target.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn<R: ReplyTarget>(
    request: AggregationRequest<R>,
) -> (AggregatorHandle, JoinHandle<()>) {
    let id = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
    let AggregationRequest {
        expected_count,
        deadline,
        reply_to,
    } = request;

    let (tx, rx) = mpsc::unbounded_channel();
    let timer = DeadlineTimer::arm(deadline, tx.clone());

    let span = info_span!("aggregator", request = id, expected = expected_count.get());
    let task = tokio::spawn(
        run(Aggregation::new(expected_count), rx, timer, reply_to).instrument(span),
    );

    debug!(
        "Spawned aggregator {} expecting {} results within {:?}",
        id, expected_count, deadline
    );

    (AggregatorHandle { id, events: tx }, task)
}

async fn run<R: ReplyTarget>(
    mut state: Aggregation,
    mut events: mpsc::UnboundedReceiver<AggregatorEvent>,
    timer: DeadlineTimer,
    reply_to: R,
) {
    let outcome = loop {
        match events.recv().await {
            Some(event) => {
                trace!(?event, "Processing event");
                if let Some(outcome) = state.apply(event) {
                    break outcome;
                }
            }
            // Only reachable if the timer task was torn down externally,
            // e.g. during runtime shutdown.
            None => {
                warn!("Event channel closed before completion, treating as deadline");
                break state
                    .on_deadline_expired()
                    .unwrap_or_else(Outcome::unavailable);
            }
        }
    };

    drop(timer);
    events.close();

    info!(
        "Aggregation finished with {} of {} results: {}",
        state.results().len(),
        state.expected_count(),
        outcome
    );

    if !reply_to.reply(outcome) {
        warn!("Reply target dropped before the outcome was delivered");
    }
}
