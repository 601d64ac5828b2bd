//! GEO Sensor Core
//!
//! Core types for the GEO Sensor job tracking client.
//!
//! This crate contains:
//! - Domain types: analysis jobs, their lifecycle states and categories
//! - DTOs: response envelopes used by the HTTP API

pub mod domain;
pub mod dto;

pub use domain::category::Category;
pub use domain::job::{InvalidJobId, JobId, JobState, JobStatus};
