//! ARcane Core
//!
//! Shared building blocks for the ARcane engine: logging, profiling hooks,
//! window geometry and engine configuration.

pub mod config;
pub mod geometry;
pub mod logging;
pub mod profiling;
