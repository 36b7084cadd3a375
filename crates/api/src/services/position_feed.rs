//! Positioning capability backed by device reports.
//!
//! The device runs the actual positioning hardware and posts each completion
//! to the server. [`ReportedPositionProvider`] keeps track of which requests
//! the location source has outstanding and turns a report into the matching
//! completions.
//!
//! Every outstanding request also carries a deadline. The provider only
//! announces deadlines on a channel; [`spawn_deadline_driver`] owns the
//! timers and, when one fires, delivers the resulting completion to the
//! session under its lock. A report that arrives first re-arms the request,
//! which makes the earlier deadline stale.

use std::sync::Weak;
use std::time::Duration;

use domain::models::{
    PositionError, PositionErrorKind, PositionFix, PositionOptions, PositionOrigin, PositionUpdate,
    WatchId,
};
use domain::services::{AlertFeedback, PositionProvider, TrackingSession};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::middleware::metrics::record_alerts_triggered;

/// A timer armed for one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionDeadline {
    pub origin: PositionOrigin,
    pub after: Duration,
    generation: u64,
}

#[derive(Debug, Clone)]
struct Outstanding {
    options: PositionOptions,
    generation: u64,
    /// A recent enough report that answers the request as soon as its
    /// deadline (zero) fires.
    cached: Option<PositionFix>,
}

#[derive(Debug)]
pub struct ReportedPositionProvider {
    supported: bool,
    pending_one_shot: Option<Outstanding>,
    active_watch: Option<(WatchId, Outstanding)>,
    next_watch_id: WatchId,
    generation: u64,
    last_fix: Option<(PositionFix, Instant)>,
    deadlines: mpsc::UnboundedSender<PositionDeadline>,
}

impl ReportedPositionProvider {
    pub fn new(supported: bool, deadlines: mpsc::UnboundedSender<PositionDeadline>) -> Self {
        Self {
            supported,
            pending_one_shot: None,
            active_watch: None,
            next_watch_id: 0,
            generation: 0,
            last_fix: None,
            deadlines,
        }
    }

    /// Completions for one device report.
    ///
    /// An outstanding one-shot request is answered first and only once; the
    /// active watch receives every report and waits again. Empty when
    /// nothing is outstanding.
    pub fn route(&mut self, result: Result<PositionFix, PositionError>) -> Vec<PositionUpdate> {
        let mut updates = Vec::with_capacity(2);

        if let Ok(fix) = &result {
            self.last_fix = Some((*fix, Instant::now()));
        }

        if self.pending_one_shot.take().is_some() {
            updates.push(PositionUpdate {
                origin: PositionOrigin::OneShot,
                result: result.clone(),
            });
        }

        if let Some((id, outstanding)) = self.active_watch.take() {
            let origin = PositionOrigin::Watch(id);
            let next = self.arm(origin, &outstanding.options, None);
            self.active_watch = Some((id, next));
            updates.push(PositionUpdate { origin, result });
        }

        updates
    }

    /// The completion owed when `deadline` fires, if the request it was armed
    /// for is still waiting.
    ///
    /// A one-shot request ends here. A watch delivers its cached report or a
    /// timeout, then waits again.
    pub fn expire(&mut self, deadline: &PositionDeadline) -> Option<PositionUpdate> {
        match deadline.origin {
            PositionOrigin::OneShot => {
                let current = self.pending_one_shot.as_ref().map(|p| p.generation);
                if current != Some(deadline.generation) {
                    return None;
                }
                let outstanding = self.pending_one_shot.take()?;
                Some(PositionUpdate {
                    origin: deadline.origin,
                    result: Self::answer(outstanding),
                })
            }
            PositionOrigin::Watch(id) => {
                let current = self.active_watch.as_ref().map(|(w, o)| (*w, o.generation));
                if current != Some((id, deadline.generation)) {
                    return None;
                }
                let (_, outstanding) = self.active_watch.take()?;
                let next = self.arm(deadline.origin, &outstanding.options, None);
                self.active_watch = Some((id, next));
                Some(PositionUpdate {
                    origin: deadline.origin,
                    result: Self::answer(outstanding),
                })
            }
        }
    }

    pub fn has_pending_one_shot(&self) -> bool {
        self.pending_one_shot.is_some()
    }

    pub fn active_watch(&self) -> Option<WatchId> {
        self.active_watch.as_ref().map(|(id, _)| *id)
    }

    fn answer(outstanding: Outstanding) -> Result<PositionFix, PositionError> {
        match outstanding.cached {
            Some(fix) => Ok(fix),
            None => {
                debug!(
                    timeout_ms = outstanding.options.timeout_ms,
                    "Position request timed out"
                );
                Err(PositionError::from_kind(PositionErrorKind::Timeout))
            }
        }
    }

    /// Last report, if it is no older than the request accepts.
    fn cached_fix(&self, options: &PositionOptions) -> Option<PositionFix> {
        if options.maximum_age_ms == 0 {
            return None;
        }
        let (fix, received) = self.last_fix.as_ref()?;
        (received.elapsed() <= Duration::from_millis(options.maximum_age_ms)).then_some(*fix)
    }

    fn arm(
        &mut self,
        origin: PositionOrigin,
        options: &PositionOptions,
        cached: Option<PositionFix>,
    ) -> Outstanding {
        self.generation += 1;
        let after = if cached.is_some() {
            Duration::ZERO
        } else {
            Duration::from_millis(options.timeout_ms)
        };

        let deadline = PositionDeadline {
            origin,
            after,
            generation: self.generation,
        };
        if self.deadlines.send(deadline).is_err() {
            debug!(?origin, "Deadline driver stopped, request will not time out");
        }

        Outstanding {
            options: *options,
            generation: self.generation,
            cached,
        }
    }
}

impl PositionProvider for ReportedPositionProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn request_position(&mut self, options: &PositionOptions) {
        debug!(timeout_ms = options.timeout_ms, "Awaiting one-shot position report");
        let cached = self.cached_fix(options);
        self.pending_one_shot = Some(self.arm(PositionOrigin::OneShot, options, cached));
    }

    fn watch_position(&mut self, options: &PositionOptions) -> WatchId {
        self.next_watch_id += 1;
        let id = self.next_watch_id;
        let cached = self.cached_fix(options);
        let outstanding = self.arm(PositionOrigin::Watch(id), options, cached);
        self.active_watch = Some((id, outstanding));
        debug!(watch_id = id, "Position watch opened");
        id
    }

    fn clear_watch(&mut self, id: WatchId) {
        if self.active_watch() == Some(id) {
            self.active_watch = None;
            // An unanswered one-shot belongs to the same tracking run.
            self.pending_one_shot = None;
            debug!(watch_id = id, "Position watch cleared");
        }
    }
}

/// Runs the timers announced by a [`ReportedPositionProvider`].
///
/// Ends once the session is gone and the provider's sender with it.
pub fn spawn_deadline_driver<F>(
    mut deadlines: mpsc::UnboundedReceiver<PositionDeadline>,
    session: Weak<Mutex<TrackingSession<ReportedPositionProvider, F>>>,
) -> JoinHandle<()>
where
    F: AlertFeedback + 'static,
{
    tokio::spawn(async move {
        while let Some(deadline) = deadlines.recv().await {
            let session = session.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline.after).await;

                let Some(session) = session.upgrade() else {
                    return;
                };
                let mut session = session.lock().await;
                let Some(update) = session
                    .location_source_mut()
                    .provider_mut()
                    .expire(&deadline)
                else {
                    return;
                };

                let triggered_before = session.proximity().alerts_triggered();
                session.on_position(update);
                record_alerts_triggered(session.proximity().alerts_triggered() - triggered_before);
            });
        }
        debug!("Position deadline driver stopped");
    })
}
