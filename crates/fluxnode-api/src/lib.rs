//! # fluxnode-api
//!
//! HTTP surface for the node telemetry operations. Every endpoint answers
//! with the tagged `{status, data}` envelope, including on failure.
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `GET /apps/applog[/{container}]` | bounded log capture |
//! | `GET /apps/appexec[/{container}[/{cmd}[/{env}]]]` | bounded exec capture |
//! | `GET /apps/fluxusage` | node usage score |

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod handlers;
pub mod params;
pub mod server;

pub use handlers::AppState;
pub use server::{bind, build_router, serve};
