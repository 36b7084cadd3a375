//! Continuous device location tracking.
//!
//! [`LocationSource`] asks the positioning capability for one immediate fix
//! plus a continuous subscription. Completions arrive later, at the
//! platform's own cadence, and are fed back through
//! [`LocationSource::handle_update`]. Positioning failures never escape:
//! they become the `error` / `permission_status` state.

use tracing::{debug, info, warn};
use validator::Validate;

use crate::models::location::LocationStateResponse;
use crate::models::{
    LocationSample, PermissionStatus, PositionError, PositionFix, PositionOptions, PositionOrigin,
    PositionUpdate, TrackingStatus, WatchId,
};

/// Error recorded when the platform has no positioning capability.
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by this device";

/// Device positioning capability.
///
/// Requests complete asynchronously; their results are delivered to
/// [`LocationSource::handle_update`] as [`PositionUpdate`]s.
pub trait PositionProvider: Send {
    /// Whether positioning exists on this platform at all.
    fn is_supported(&self) -> bool;

    /// Start a one-shot position request.
    fn request_position(&mut self, options: &PositionOptions);

    /// Open a continuous subscription.
    fn watch_position(&mut self, options: &PositionOptions) -> WatchId;

    /// Cancel a subscription opened by `watch_position`.
    fn clear_watch(&mut self, id: WatchId);
}

/// Tracks the latest location sample and the positioning status.
pub struct LocationSource<P: PositionProvider> {
    provider: P,
    location: Option<LocationSample>,
    acquiring: bool,
    error: Option<String>,
    permission: PermissionStatus,
    watch_id: Option<WatchId>,
    unsupported: bool,
}

impl<P: PositionProvider> LocationSource<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            location: None,
            acquiring: false,
            error: None,
            permission: PermissionStatus::Prompt,
            watch_id: None,
            unsupported: false,
        }
    }

    /// Request an immediate fix and subscribe to continuous updates.
    pub fn start_tracking(&mut self) {
        if self.unsupported || !self.provider.is_supported() {
            if !self.unsupported {
                warn!("Positioning is not supported; tracking disabled");
            }
            self.unsupported = true;
            self.error = Some(UNSUPPORTED_MESSAGE.to_string());
            self.acquiring = false;
            return;
        }

        // A restart must not leave the previous subscription behind.
        self.stop_tracking();

        self.acquiring = true;
        self.error = None;

        self.provider.request_position(&PositionOptions::ONE_SHOT);
        let watch_id = self.provider.watch_position(&PositionOptions::WATCH);
        self.watch_id = Some(watch_id);

        info!(watch_id, "Location tracking started");
    }

    /// Cancel the continuous subscription. Safe to call at any time.
    pub fn stop_tracking(&mut self) {
        if let Some(id) = self.watch_id.take() {
            self.provider.clear_watch(id);
            info!(watch_id = id, "Location tracking stopped");
        }
    }

    /// Apply a position completion. Returns true when the current sample
    /// changed.
    pub fn handle_update(&mut self, update: PositionUpdate) -> bool {
        if let PositionOrigin::Watch(id) = update.origin {
            if self.watch_id != Some(id) {
                debug!(watch_id = id, "Ignoring update from inactive watch");
                return false;
            }
        }

        match update.result {
            Ok(fix) => self.apply_fix(update.origin, fix),
            Err(err) => {
                self.apply_error(update.origin, err);
                false
            }
        }
    }

    fn apply_fix(&mut self, origin: PositionOrigin, fix: PositionFix) -> bool {
        if let Err(e) = fix.validate() {
            warn!(error = %e, "Discarding invalid position fix");
            return false;
        }

        if let Some(current) = &self.location {
            if fix.timestamp < current.timestamp {
                debug!(
                    timestamp = fix.timestamp,
                    current = current.timestamp,
                    "Discarding out-of-order position fix"
                );
                return false;
            }
        }

        self.location = Some(LocationSample::from_fix(&fix));
        self.permission = PermissionStatus::Granted;
        self.acquiring = false;
        if matches!(origin, PositionOrigin::Watch(_)) {
            self.error = None;
        }

        debug!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            accuracy = fix.accuracy,
            "Location updated"
        );
        true
    }

    fn apply_error(&mut self, origin: PositionOrigin, err: PositionError) {
        warn!(kind = ?err.kind, error = %err, "Position request failed");

        // The last good sample stays in place.
        self.error = Some(err.message);
        self.permission = PermissionStatus::Denied;
        if origin == PositionOrigin::OneShot {
            self.acquiring = false;
        }
    }

    pub fn location(&self) -> Option<&LocationSample> {
        self.location.as_ref()
    }

    pub fn is_acquiring(&self) -> bool {
        self.acquiring
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn permission_status(&self) -> PermissionStatus {
        self.permission
    }

    pub fn is_tracking(&self) -> bool {
        self.watch_id.is_some()
    }

    pub fn watch_id(&self) -> Option<WatchId> {
        self.watch_id
    }

    /// False once the platform reported that positioning is unavailable.
    pub fn is_supported(&self) -> bool {
        !self.unsupported
    }

    pub fn status(&self) -> TrackingStatus {
        TrackingStatus::derive(
            self.acquiring,
            self.error.is_some(),
            self.permission,
            self.location.is_some(),
        )
    }

    pub fn state(&self) -> LocationStateResponse {
        LocationStateResponse {
            location: self.location.as_ref().map(Into::into),
            acquiring: self.acquiring,
            error: self.error.clone(),
            permission_status: self.permission,
            tracking: self.is_tracking(),
            status: self.status(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}

impl<P: PositionProvider> Drop for LocationSource<P> {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}
