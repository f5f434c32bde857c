//! Auth types shared across Inkpost services.
//!
//! Provides bearer-token issuance/validation and the `BearerToken` extractor.

pub mod identity;
pub mod token;
