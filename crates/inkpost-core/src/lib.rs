//! Service plumbing shared by Inkpost services: configuration, tracing,
//! middleware, health checks and small sea-orm extensions.

pub mod clock;
pub mod config;
pub mod health;
pub mod middleware;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
