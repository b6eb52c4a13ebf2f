//! # Fetch abstractions and raw snapshot types.
//!
//! This module provides the data-source boundary:
//! - [`Fetch`] - trait for popularity data providers
//! - [`FetchFn`] - adapter wrapping a blocking fetch function
//! - [`FetchRef`] - shared reference to a provider (`Arc<dyn Fetch>`)
//! - [`VenueSnapshot`] / [`DayCurve`] - raw fetch result as it comes off
//!   the wire, before normalization

mod fetch_fn;
mod fetcher;
mod snapshot;

pub use fetch_fn::FetchFn;
pub use fetcher::{Fetch, FetchRef};
pub use snapshot::{DayCurve, VenueSnapshot};
