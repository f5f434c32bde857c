//! Test utilities for Inkpost services.
//!
//! Provides `MockAuth` for signed bearer headers and `ManualClock` for
//! deterministic time. Import in `#[cfg(test)]` blocks only, never in
//! production code.

pub mod auth;
pub mod clock;
