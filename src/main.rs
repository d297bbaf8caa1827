//! `autodash` is a small web dashboard for Salesforce Marketing Cloud automations. It mainly uses
//! `axum`, `reqwest` and `quick-xml` under the hood.
//!
//! The user logs in through the OAuth2 authorization-code flow, after which the dashboard
//! retrieves all active Automation objects from the SOAP API and renders name and status of each.
//! The data pipeline lives in `auth.rs`, `automations.rs` and `soap.rs`; the CLI in `clap_app.rs`.

mod auth;
mod automations;
mod clap_app;
mod clap_models;
mod client;
mod config;
mod dashboard;
mod errors;
mod models;
mod server;
mod session;
mod soap;

use crate::clap_app::init_cli;

#[tokio::main]
async fn main() {
    // enable logger
    env_logger::init();

    // Enable virtual terminal to correctly colorize output on Windows 10 machines
    #[cfg(target_os = "windows")]
    let _ = colored::control::set_virtual_terminal(true);

    init_cli().await;
}
