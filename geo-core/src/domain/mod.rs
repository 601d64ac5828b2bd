//! Core domain types
//!
//! This module contains the structures the GEO Sensor backend reports about
//! analysis jobs. They are shared between the HTTP client (which decodes them)
//! and the poller (which exposes them to the presentation layer).

pub mod category;
pub mod job;
