//! Proportional interleaving of ordered streams
//!
//! This module provides:
//! - Stream and placement models
//! - The lag-score scheduler (heap-driven, with a linear-scan reference)
//! - Precondition checks on stream input

pub mod algorithm;
pub mod models;

pub use algorithm::{schedule, schedule_naive};
pub use models::*;
