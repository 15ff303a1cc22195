//! Reply targets that receive an aggregation's outcome.

use crate::models::Outcome;
use tokio::sync::{mpsc, oneshot};

/// Destination for the single outcome of an aggregation.
///
/// `reply` consumes the target, so a target can be answered at most once.
pub trait ReplyTarget: Send + 'static {
    /// Delivers the outcome. Returns false if the receiving side is gone.
    fn reply(self, outcome: Outcome) -> bool;
}

impl ReplyTarget for oneshot::Sender<Outcome> {
    fn reply(self, outcome: Outcome) -> bool {
        self.send(outcome).is_ok()
    }
}

impl ReplyTarget for mpsc::UnboundedSender<Outcome> {
    fn reply(self, outcome: Outcome) -> bool {
        self.send(outcome).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oneshot_reply() {
        let (tx, mut rx) = oneshot::channel();
        assert!(tx.reply(Outcome::Success { mean: 1.0 }));
        assert_eq!(rx.try_recv().unwrap(), Outcome::Success { mean: 1.0 });
    }

    #[test]
    fn test_reply_to_dropped_receiver() {
        let (tx, rx) = oneshot::channel::<Outcome>();
        drop(rx);
        assert!(!tx.reply(Outcome::unavailable()));

        let (tx, rx) = mpsc::unbounded_channel::<Outcome>();
        drop(rx);
        assert!(!tx.reply(Outcome::unavailable()));
    }
}
