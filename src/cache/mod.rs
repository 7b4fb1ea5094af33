//! Cache Module
//!
//! Provides the time-boxed snapshot of the unfiltered property list.

mod clock;
mod listing;
mod stats;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use listing::ListingCache;
pub use stats::CacheStats;
