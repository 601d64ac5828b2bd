//! Data Transfer Objects for the GEO Sensor API
//!
//! Wrappers around domain types that only exist on the wire.

pub mod job;
