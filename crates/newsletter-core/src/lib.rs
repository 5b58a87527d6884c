//! Normalization and summary-statistics engine for the newsletter dashboard.
//!
//! Header detection, cell normalization, week-label date resolution and the
//! summary calculator work on in-memory data only. Functions that need the
//! current date take it explicitly through their `*_at` variants. Only
//! `settings` touches the file system.

pub mod calculations;
pub mod dates;
pub mod error;
pub mod fields;
pub mod formatting;
pub mod models;
pub mod normalize;
pub mod settings;

pub use error::{DashboardError, Result};
