//! Data layer for the newsletter dashboard.
//!
//! Reads spreadsheet snapshots, turns the active sheet into an ordered weekly
//! series, derives growth and monthly roll-ups, and runs the top-level
//! analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod series;

pub use newsletter_core as core;
