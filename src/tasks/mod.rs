//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Reaper: Sampling sweep that reclaims expired entries at a fixed cadence

mod reaper;

pub use reaper::spawn_reaper;
