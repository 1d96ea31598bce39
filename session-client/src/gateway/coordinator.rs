use std::mem;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::errors::GatewayError;
use crate::models::AccessToken;

pub(crate) type RefreshOutcome = Result<AccessToken, GatewayError>;

#[derive(Default)]
struct CoordinatorState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Single-flight gate around the refresh call.
///
/// The lock is only taken for flag and queue bookkeeping, never across an
/// `.await`.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
}

/// What a caller that saw `TOKEN_EXPIRED` should do next.
pub(crate) enum Ticket<'a> {
    /// Run the refresh and settle it.
    Leader(LeaderGuard<'a>),
    /// Wait for the in-flight refresh.
    Waiter(oneshot::Receiver<RefreshOutcome>),
    /// Someone already refreshed since this call was sent; retry with this.
    Fresh(AccessToken),
    /// The session is gone.
    Ended,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().in_flight
    }

    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Decide the caller's role in one locked step.
    ///
    /// `current` reads the stored access token and is only consulted when no
    /// refresh is in flight.
    pub(crate) fn join<F>(&self, sent_with: Option<&AccessToken>, current: F) -> Ticket<'_>
    where
        F: FnOnce() -> Option<AccessToken>,
    {
        let mut state = self.state.lock();

        if state.in_flight {
            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            return Ticket::Waiter(receiver);
        }

        match current() {
            None => Ticket::Ended,
            Some(token) if Some(&token) != sent_with => Ticket::Fresh(token),
            Some(_) => {
                state.in_flight = true;
                Ticket::Leader(LeaderGuard {
                    coordinator: self,
                    settled: false,
                })
            }
        }
    }

    /// Clear the flag and release every waiter, in enqueue order, with the
    /// same outcome.
    fn settle(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.in_flight = false;
            mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // Receiver gone means that caller was dropped; nothing to deliver.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// Held by the one caller running the refresh. Dropping it unsettled rejects
/// the waiters so the flag cannot stay stuck.
pub(crate) struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl LeaderGuard<'_> {
    pub(crate) fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Refresh abandoned before it settled");
            self.coordinator.settle(Err(GatewayError::RefreshAbandoned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value)
    }

    fn leader<'a>(coordinator: &'a RefreshCoordinator) -> LeaderGuard<'a> {
        match coordinator.join(Some(&token("old")), || Some(token("old"))) {
            Ticket::Leader(guard) => guard,
            _ => panic!("expected to lead"),
        }
    }

    #[test]
    fn first_caller_leads_and_later_callers_wait() {
        let coordinator = RefreshCoordinator::new();
        let _leader = leader(&coordinator);

        assert!(coordinator.is_refreshing());
        assert!(matches!(
            coordinator.join(Some(&token("old")), || unreachable!()),
            Ticket::Waiter(_)
        ));
        assert_eq!(coordinator.waiting(), 1);
    }

    #[tokio::test]
    async fn waiters_receive_the_same_outcome_in_order() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(&coordinator);

        let receivers: Vec<_> = (0..3)
            .map(|_| match coordinator.join(None, || None) {
                Ticket::Waiter(receiver) => receiver,
                _ => panic!("expected to wait"),
            })
            .collect();

        assert_eq!(guard.settle(Ok(token("new"))), 3);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);

        for receiver in receivers {
            assert_eq!(receiver.await.unwrap(), Ok(token("new")));
        }
    }

    #[tokio::test]
    async fn dropped_leader_rejects_waiters() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(&coordinator);
        let receiver = match coordinator.join(None, || None) {
            Ticket::Waiter(receiver) => receiver,
            _ => panic!("expected to wait"),
        };

        drop(guard);

        assert!(!coordinator.is_refreshing());
        assert_eq!(receiver.await.unwrap(), Err(GatewayError::RefreshAbandoned));
    }

    #[test]
    fn newer_stored_token_skips_refresh() {
        let coordinator = RefreshCoordinator::new();

        match coordinator.join(Some(&token("old")), || Some(token("new"))) {
            Ticket::Fresh(fresh) => assert_eq!(fresh, token("new")),
            _ => panic!("expected the stored token"),
        }
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn empty_store_ends_without_refreshing() {
        let coordinator = RefreshCoordinator::new();

        assert!(matches!(
            coordinator.join(Some(&token("old")), || None),
            Ticket::Ended
        ));
        assert!(!coordinator.is_refreshing());
    }
}
