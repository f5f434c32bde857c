pub mod auth;
pub mod credential;
pub mod status;
pub mod user;
