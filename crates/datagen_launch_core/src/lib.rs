//! Shared data-generation launch domain primitives.
//!
//! This crate owns the request/response contracts, the generation-config
//! model, and the throttle decision. It intentionally excludes AWS SDK and
//! Lambda runtime concerns, which live in `datagen_launch_lambda`.

pub mod config;
pub mod contract;
pub mod error;
pub mod throttle;
