pub mod auth;
pub mod session;
pub mod status;
pub mod user;
