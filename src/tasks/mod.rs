//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache sweep: drops the listing snapshot once its TTL has elapsed

mod sweep;

pub use sweep::spawn_cache_sweep_task;
