//! AWS-oriented adapters and handlers for launching data-generation tasks.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! adapter traits over the network directory and task orchestrator). The
//! concrete AWS clients live in the binary; handlers only see trait objects,
//! which keeps them testable without a cloud account.

pub mod adapters;
pub mod handlers;
