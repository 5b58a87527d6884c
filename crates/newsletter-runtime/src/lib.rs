//! Runtime layer for the newsletter dashboard.
//!
//! Caches spreadsheet snapshots and drives the periodic refresh loop that
//! feeds fresh analyses to the presentation layer.

pub mod data_manager;
pub mod orchestrator;

pub use newsletter_core as core;
pub use newsletter_data as data;
