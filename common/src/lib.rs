//! Shared data model for sweepr.
//!
//! Everything that is computed *before* a single packet leaves the machine
//! lives here: address and port expansion, the scan target model, the
//! per-host report and the scan configuration.

pub mod config;
pub mod error;
pub mod network;
pub mod utils;
