//! # fluxnode-common
//!
//! Shared types, error definitions, configuration models, constants and the
//! tagged response envelope used across the fluxnode workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the runtime, usage and API
//! crates build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod constants;
pub mod error;
pub mod response;
pub mod types;
