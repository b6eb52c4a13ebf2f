//! # Raw fetch result types.
//!
//! [`VenueSnapshot`] is the shape one successful fetch produces, straight off
//! the wire: every field optional, nothing normalized yet. The refresh engine
//! consumes it exactly once per cycle and turns it into a
//! [`PopularityReading`](crate::PopularityReading).
//!
//! The types deserialize with serde so a transport can decode them directly
//! from a JSON payload. A payload with a non-numeric popularity value fails
//! decoding; transports classify that as a permanent (malformed response)
//! error.

use serde::Deserialize;

/// Raw popularity data for one venue, as returned by a provider.
///
/// All fields are optional; [`VenueSnapshot::is_empty`] detects the
/// degenerate "nothing at all" response, which the refresh engine treats as
/// retryable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VenueSnapshot {
    /// Venue name as the data source reports it.
    #[serde(default)]
    pub name: Option<String>,
    /// Venue address as the data source reports it.
    #[serde(default)]
    pub address: Option<String>,
    /// Live occupancy estimate, when the source can supply one.
    #[serde(default)]
    pub current_popularity: Option<f64>,
    /// Historical curves, Monday first. Days the source has no data for are
    /// `None`; the sequence may be shorter than 7.
    #[serde(default)]
    pub populartimes: Vec<Option<DayCurve>>,
}

impl VenueSnapshot {
    /// Returns `true` when the snapshot carries no information at all:
    /// no name, no address, no live value, and no historical curves.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.current_popularity.is_none()
            && self.populartimes.iter().all(Option::is_none)
    }

    /// Returns the historical curve for a weekday (0 = Monday .. 6 = Sunday),
    /// if the source supplied one.
    pub fn day(&self, weekday: usize) -> Option<&DayCurve> {
        self.populartimes.get(weekday).and_then(Option::as_ref)
    }
}

/// One weekday's hourly occupancy estimates (index 0 = midnight local time).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DayCurve {
    /// 24 hourly values. Sources occasionally send fewer; missing hours read
    /// as absent, never as zero.
    pub data: Vec<i32>,
}

impl DayCurve {
    /// Returns the value for an hour (0..23), if present.
    pub fn hour(&self, hour: usize) -> Option<i32> {
        self.data.get(hour).copied()
    }
}
