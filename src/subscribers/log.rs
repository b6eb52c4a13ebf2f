//! # Simple logging consumer for debugging and demos.
//!
//! [`LogWriter`] prints every delivered outcome to stdout in a
//! human-readable format.
//!
//! ## Output format
//! ```text
//! [reading] venue="Cafe Luna" value=63% live=true
//! [reading] venue="Cafe Luna" value=40% live=false
//! [refresh-failed] err="retries exhausted after 3 attempts: ..."
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use popwatch::{Bus, FanOut, LogWriter};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fanout = FanOut::new(Bus::new(64));
//! fanout.register(Arc::new(LogWriter));
//! # }
//! ```

use async_trait::async_trait;

use crate::error::RefreshError;
use crate::reading::PopularityReading;
use crate::subscribers::consumer::Consume;

/// Simple stdout logging consumer.
///
/// Enabled via the `logging` feature. Prints human-readable lines per
/// delivered reading or failure, for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Consume`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Consume for LogWriter {
    async fn on_reading(&self, reading: &PopularityReading) {
        println!(
            "[reading] venue={:?} value={}% live={}",
            reading.venue_name.as_deref().unwrap_or("?"),
            reading.value,
            reading.is_live,
        );
    }

    async fn on_refresh_failed(&self, error: &RefreshError) {
        println!("[refresh-failed] err={:?}", error.to_string());
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
