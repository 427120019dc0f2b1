//! Crew assignment engine for operational duty rosters.
//!
//! The engine lives under [`workflows::crew`]; configuration, telemetry and the
//! application error type are shared with the API service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
