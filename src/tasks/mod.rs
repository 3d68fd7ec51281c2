//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the cache is live.
//!
//! # Tasks
//! - Scheduler: evaluates every key once per tick and issues due fetches

mod scheduler;

pub use scheduler::{spawn_scheduler, Scheduler};
