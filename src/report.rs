//! Diagnostics emitted while scanning.
//!
//! Unreadable locations and version conflicts are not errors: the scan carries
//! on. They are handed to a [`ScanReporter`] instead, which by default logs
//! them through `tracing`.

use crate::error::ScanError;
use crate::model::PackageConflict;
use serde::Serialize;
use std::sync::Mutex;
use tracing::warn;

pub trait ScanReporter: Send + Sync {
    /// A location contributed no records because it could not be read.
    fn location_failed(&self, location: &str, error: &ScanError);

    /// The same package was found at two locations with different versions.
    fn conflict(&self, conflict: &PackageConflict);
}

/// Logs diagnostics as `tracing` warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ScanReporter for TracingReporter {
    fn location_failed(&self, location: &str, error: &ScanError) {
        warn!(location = %location, error = %error, "could not read location, skipping");
    }

    fn conflict(&self, conflict: &PackageConflict) {
        warn!(
            package = %conflict.package,
            current = %conflict.current.origin_name(),
            incoming = %conflict.incoming.origin_name(),
            current_version = conflict.current.version().unwrap_or("-"),
            incoming_version = conflict.incoming.version().unwrap_or("-"),
            "found duplicates for package with different versions"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanEvent {
    LocationFailed { location: String, reason: String },
    Conflict(PackageConflict),
}

/// Keeps every diagnostic in memory, in the order received.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ScanEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScanEvent> {
        self.lock().clone()
    }

    pub fn conflicts(&self) -> Vec<PackageConflict> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Conflict(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failed_locations(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ScanEvent::LocationFailed { location, .. } => Some(location.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScanEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ScanReporter for RecordingReporter {
    fn location_failed(&self, location: &str, error: &ScanError) {
        self.lock().push(ScanEvent::LocationFailed {
            location: location.to_string(),
            reason: error.to_string(),
        });
    }

    fn conflict(&self, conflict: &PackageConflict) {
        self.lock().push(ScanEvent::Conflict(conflict.clone()));
    }
}
