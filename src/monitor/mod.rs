//! The tick-monitoring state machine and its poll loop.
//!
//! [`TickMonitor`] owns the process-lifetime [`MonitorState`] behind a single
//! mutex; both the scheduled check and the command handlers reach that state
//! only through methods on the monitor, which keeps the locking discipline in
//! one place. The lock is never held across a network await, so a command may
//! observe the pre-update value while a check is in flight; the value is only
//! ever read for display.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{sync::Mutex, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    models::{DestinationId, TickValue},
    notification::{Notifier, TickMessage},
    providers::TickSource,
};

/// Process-lifetime monitor state. Not persisted: a restart forgets any
/// runtime reconfiguration and re-fetches the baseline from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    /// The last tick observed from the feed, absent until the first
    /// successful fetch.
    pub last_known_tick: Option<TickValue>,
    /// Where announcements go. Unset disables notifications.
    pub destination: Option<DestinationId>,
}

/// Result of one scheduled check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The fetch failed; nothing was mutated and nothing was sent. The next
    /// scheduled run retries from scratch.
    FetchFailed,
    /// The feed reported the value we already hold.
    Unchanged,
    /// The feed reported a different value; state was updated and, if a
    /// destination is configured, one announcement was dispatched.
    Changed {
        /// The previously stored tick. `None` when the startup baseline was
        /// never established (initial fetch failed).
        previous: Option<TickValue>,
        /// The newly observed tick.
        current: TickValue,
    },
}

/// Watches the tick feed and announces changes.
pub struct TickMonitor {
    source: Arc<dyn TickSource>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<MonitorState>,
    check_interval: Duration,
}

impl TickMonitor {
    /// Creates a monitor with an optional startup destination (from static
    /// configuration; `!tickchannel` can overwrite it at runtime).
    pub fn new(
        source: Arc<dyn TickSource>,
        notifier: Arc<dyn Notifier>,
        check_interval: Duration,
        destination: Option<DestinationId>,
    ) -> Self {
        Self {
            source,
            notifier,
            state: Mutex::new(MonitorState { last_known_tick: None, destination }),
            check_interval,
        }
    }

    /// The tick source this monitor polls, shared with the command path.
    pub fn source(&self) -> Arc<dyn TickSource> {
        Arc::clone(&self.source)
    }

    /// The configured poll period.
    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Records the first observation as a baseline. Never notifies: there is
    /// no old value to compare against, so the first tick seen is not an
    /// event. A failed fetch leaves the baseline unset and the first
    /// successful check records it instead.
    pub async fn initialize(&self) {
        match self.source.fetch_tick().await {
            Ok(tick) => {
                info!(tick = %tick, "Initial tick baseline recorded");
                self.state.lock().await.last_known_tick = Some(tick);
            }
            Err(error) => {
                warn!(%error, "Could not fetch initial tick; the first successful check will set the baseline");
            }
        }
    }

    /// Performs one check cycle: fetch, compare, and notify on change.
    pub async fn run_check(&self) -> CheckOutcome {
        let current = match self.source.fetch_tick().await {
            Ok(tick) => tick,
            Err(error) => {
                error!(%error, "Tick fetch failed; skipping this cycle");
                return CheckOutcome::FetchFailed;
            }
        };

        // Update under the lock, then release it before any delivery await.
        let (previous, destination) = {
            let mut state = self.state.lock().await;
            if state.last_known_tick.as_ref() == Some(&current) {
                debug!(tick = %current, "No new tick detected");
                return CheckOutcome::Unchanged;
            }
            let previous = state.last_known_tick.replace(current.clone());
            (previous, state.destination)
        };

        info!(previous = ?previous.as_ref().map(TickValue::as_str), current = %current, "New tick detected");

        match destination {
            Some(destination) => {
                let message = TickMessage::announcement(&current, Utc::now());
                if let Err(error) = self.notifier.notify(destination, &message).await {
                    // The tick stays recorded; there is no redelivery.
                    error!(%error, %destination, "Failed to deliver tick announcement");
                }
            }
            None => {
                warn!("New tick detected but no notification channel is configured");
            }
        }

        CheckOutcome::Changed { previous, current }
    }

    /// Runs the poll loop: baseline fetch, one immediate check, then one
    /// check per period until `shutdown` fires. Each check runs to completion
    /// (bounded by the fetch deadline) before the next is considered, so runs
    /// never overlap; a slow run degenerates to back-to-back checks.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        self.initialize().await;

        let mut interval = tokio::time::interval(self.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period_secs = self.check_interval.as_secs(), "Tick monitoring started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Tick monitoring stopped");
                    return;
                }
                _ = interval.tick() => {
                    self.run_check().await;
                }
            }
        }
    }

    /// Redirects announcements to a new destination.
    pub async fn set_destination(&self, destination: DestinationId) {
        info!(%destination, "Tick notification channel reconfigured");
        self.state.lock().await.destination = Some(destination);
    }

    /// A copy of the current monitor state, for display.
    pub async fn snapshot(&self) -> MonitorState {
        self.state.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::always;

    use super::*;
    use crate::{
        notification::{MockNotifier, NotificationError},
        providers::{MockTickSource, TickSourceError},
    };

    fn tick(raw: &str) -> TickValue {
        TickValue::new(raw)
    }

    fn monitor_with(
        source: MockTickSource,
        notifier: MockNotifier,
        destination: Option<DestinationId>,
    ) -> TickMonitor {
        TickMonitor::new(
            Arc::new(source),
            Arc::new(notifier),
            Duration::from_secs(300),
            destination,
        )
    }

    #[tokio::test]
    async fn initialize_records_baseline_without_notifying() {
        let mut source = MockTickSource::new();
        source
            .expect_fetch_tick()
            .times(1)
            .returning(|| Ok(tick("2025-01-01T00:00:00Z")));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        monitor.initialize().await;

        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-01T00:00:00Z")));
    }

    #[tokio::test]
    async fn unchanged_tick_mutates_nothing_and_sends_nothing() {
        let mut source = MockTickSource::new();
        source
            .expect_fetch_tick()
            .times(2)
            .returning(|| Ok(tick("2025-01-01T00:00:00Z")));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        monitor.initialize().await;

        assert_eq!(monitor.run_check().await, CheckOutcome::Unchanged);
        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-01T00:00:00Z")));
    }

    #[tokio::test]
    async fn changed_tick_updates_state_and_notifies_once() {
        let mut source = MockTickSource::new();
        let mut fetches = vec![
            Ok(tick("2025-01-01T00:00:00Z")),
            Ok(tick("2025-01-02T04:00:00Z")),
        ]
        .into_iter();
        source.expect_fetch_tick().times(2).returning(move || fetches.next().unwrap());

        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|destination, message| {
                destination.get() == 42 && message.body.contains("2025-01-02 04:00:00 UTC")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        monitor.initialize().await;

        let outcome = monitor.run_check().await;
        assert_eq!(
            outcome,
            CheckOutcome::Changed {
                previous: Some(tick("2025-01-01T00:00:00Z")),
                current: tick("2025-01-02T04:00:00Z"),
            }
        );
        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-02T04:00:00Z")));
    }

    #[tokio::test]
    async fn changed_tick_without_destination_updates_state_but_sends_nothing() {
        let mut source = MockTickSource::new();
        source
            .expect_fetch_tick()
            .times(1)
            .returning(|| Ok(tick("2025-01-02T04:00:00Z")));
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let monitor = monitor_with(source, notifier, None);
        let outcome = monitor.run_check().await;

        assert!(matches!(outcome, CheckOutcome::Changed { previous: None, .. }));
        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-02T04:00:00Z")));
    }

    #[tokio::test]
    async fn fetch_failure_leaves_state_untouched() {
        let mut source = MockTickSource::new();
        let mut fetches = vec![
            Ok(tick("2025-01-01T00:00:00Z")),
            Err(TickSourceError::Timeout),
        ]
        .into_iter();
        source.expect_fetch_tick().times(2).returning(move || fetches.next().unwrap());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().never();

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        monitor.initialize().await;

        assert_eq!(monitor.run_check().await, CheckOutcome::FetchFailed);
        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-01T00:00:00Z")));
    }

    #[tokio::test]
    async fn delivery_failure_does_not_roll_back_the_tick() {
        let mut source = MockTickSource::new();
        source
            .expect_fetch_tick()
            .times(1)
            .returning(|| Ok(tick("2025-01-02T04:00:00Z")));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .with(always(), always())
            .times(1)
            .returning(|_, _| Err(NotificationError::DeliveryFailed("channel gone".into())));

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        let outcome = monitor.run_check().await;

        assert!(matches!(outcome, CheckOutcome::Changed { .. }));
        let state = monitor.snapshot().await;
        assert_eq!(state.last_known_tick, Some(tick("2025-01-02T04:00:00Z")));
    }

    #[tokio::test]
    async fn chronologically_earlier_value_still_counts_as_new() {
        // The feed is the sole authority; no ordering validation is applied.
        let mut source = MockTickSource::new();
        let mut fetches = vec![
            Ok(tick("2025-01-02T00:00:00Z")),
            Ok(tick("2025-01-01T00:00:00Z")),
        ]
        .into_iter();
        source.expect_fetch_tick().times(2).returning(move || fetches.next().unwrap());
        let mut notifier = MockNotifier::new();
        notifier.expect_notify().times(1).returning(|_, _| Ok(()));

        let monitor = monitor_with(source, notifier, Some(DestinationId::new(42)));
        monitor.initialize().await;

        let outcome = monitor.run_check().await;
        assert!(matches!(outcome, CheckOutcome::Changed { .. }));
    }

    #[tokio::test]
    async fn set_destination_takes_effect_for_the_next_change() {
        let mut source = MockTickSource::new();
        source
            .expect_fetch_tick()
            .times(1)
            .returning(|| Ok(tick("2025-01-02T04:00:00Z")));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|destination, _| destination.get() == 99)
            .times(1)
            .returning(|_, _| Ok(()));

        let monitor = monitor_with(source, notifier, None);
        monitor.set_destination(DestinationId::new(99)).await;
        monitor.run_check().await;
    }
}
