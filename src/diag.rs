//! # Per-venue diagnostics report.
//!
//! [`VenueReport`] is a serializable snapshot of one watched venue:
//! configuration, refresh status, availability, and a compact view of the
//! current reading. The host formats or exports it; this crate only
//! produces the structure.
//!
//! Addresses are redacted before they leave the crate: the first
//! comma-separated segment (typically house number and street) is replaced
//! by `***`, keeping the city/region hints useful for support.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::reading::{PopularityReading, RefreshStatus};
use crate::subscribers::CurrentView;
use crate::watch::VenueSpec;

/// Redacts the street/number part of an address.
///
/// The first comma-separated segment becomes `***`; the remaining segments
/// are kept, trimmed and re-joined. Empty input passes through unchanged.
///
/// # Example
/// ```
/// use popwatch::redact_address;
///
/// assert_eq!(
///     redact_address("12 Pier Rd, Harbortown, Atlantis"),
///     "***, Harbortown, Atlantis",
/// );
/// assert_eq!(redact_address("12 Pier Rd"), "***");
/// ```
pub fn redact_address(address: &str) -> String {
    if address.trim().is_empty() {
        return address.to_string();
    }
    let mut parts: Vec<&str> = address.split(',').map(str::trim).collect();
    parts[0] = "***";
    parts.join(", ")
}

/// Compact view of a cached reading, for diagnostics export.
#[derive(Debug, Clone, Serialize)]
pub struct ReadingSummary {
    /// Normalized occupancy percentage.
    pub value: u8,
    /// Whether the value came from the live estimate.
    pub is_live: bool,
    /// When the reading was produced.
    pub captured_at: DateTime<Utc>,
}

impl From<&PopularityReading> for ReadingSummary {
    fn from(reading: &PopularityReading) -> Self {
        Self {
            value: reading.value,
            is_live: reading.is_live,
            captured_at: reading.captured_at,
        }
    }
}

/// Diagnostics snapshot for one watched venue.
#[derive(Debug, Clone, Serialize)]
pub struct VenueReport {
    /// Address-derived stable id.
    pub venue_id: String,
    /// Configured display name.
    pub name: String,
    /// Configured address with the street segment redacted.
    pub address_redacted: String,
    /// Seconds between refresh cycles.
    pub interval_secs: u64,
    /// `true` once any cycle has ever produced a reading.
    pub available: bool,
    /// Refresh outcome trail.
    pub status: RefreshStatus,
    /// Compact view of the cached reading, if any.
    pub reading: Option<ReadingSummary>,
}

impl VenueReport {
    pub(crate) fn new(spec: &VenueSpec, view: &CurrentView) -> Self {
        Self {
            venue_id: spec.venue_id(),
            name: spec.query().label().to_string(),
            address_redacted: redact_address(spec.query().address()),
            interval_secs: spec.interval().as_secs(),
            available: view.reading.is_some(),
            status: view.status.clone(),
            reading: view.reading.as_deref().map(ReadingSummary::from),
        }
    }
}
