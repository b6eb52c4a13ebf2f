//! # Snapshot normalization.
//!
//! Turns one raw [`VenueSnapshot`] into a [`PopularityReading`]:
//! - the live value wins when present;
//! - otherwise the historical grid entry for the current local weekday/hour
//!   is used ([`RefreshError::NoData`] when that slot is absent);
//! - the value is rounded, then clamped to `0..=100`;
//! - per-weekday curves are carried over as-is, never fabricated.
//!
//! A non-numeric wire value never reaches this code: it fails
//! [`VenueSnapshot`] deserialization inside the transport and surfaces as a
//! permanent (malformed response) fetch error.

use chrono::{DateTime, Datelike, Local, Timelike, Utc};

use crate::error::RefreshError;
use crate::fetch::VenueSnapshot;
use crate::reading::PopularityReading;

/// The (weekday, hour) pair used for the historical fallback.
///
/// Carried explicitly so tests can pin a deterministic slot;
/// [`DaySlot::now`] derives it from local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DaySlot {
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: usize,
    /// 0..=23, local time.
    pub hour: usize,
}

impl DaySlot {
    /// Returns the slot for the current local time.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            weekday: now.weekday().num_days_from_monday() as usize,
            hour: now.hour() as usize,
        }
    }
}

/// Normalizes a non-empty snapshot into a reading.
pub(crate) fn normalize(
    snapshot: &VenueSnapshot,
    slot: DaySlot,
    at: DateTime<Utc>,
) -> Result<PopularityReading, RefreshError> {
    let is_live = snapshot.current_popularity.is_some();
    let raw = match snapshot.current_popularity {
        Some(live) => live,
        None => match snapshot.day(slot.weekday).and_then(|d| d.hour(slot.hour)) {
            Some(historical) => f64::from(historical),
            None => return Err(RefreshError::NoData),
        },
    };

    let mut per_weekday: [Option<Vec<i32>>; 7] = Default::default();
    for (day, curve) in per_weekday.iter_mut().zip(snapshot.populartimes.iter()) {
        *day = curve.as_ref().map(|c| c.data.clone());
    }

    Ok(PopularityReading {
        value: clamp_percent(raw),
        is_live,
        venue_name: snapshot.name.clone(),
        address: snapshot.address.clone(),
        per_weekday,
        captured_at: at,
    })
}

/// Round first, then clamp to `0..=100`.
fn clamp_percent(raw: f64) -> u8 {
    let rounded = raw.round();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, 100.0) as u8
}
