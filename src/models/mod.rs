pub mod auth;
pub mod automation;
