use clap::Parser;
use colored::Colorize;
use std::process;

use crate::auth::build_authorization_url;
use crate::automations::get_automations;
use crate::clap_models::*;
use crate::client::MarketingCloudClient;
use crate::config::DashboardConfig;
use crate::errors::report_error;
use crate::models::auth::AccessToken;
use crate::server;

pub async fn init_cli() {
    let cli = Cli::parse();

    // Read config file
    let mut config = DashboardConfig::from_file(cli.config.as_str()).unwrap_or_else(|err| {
        eprintln!(
            "{} {:#}. The example config is available in the README.",
            "❌".red(),
            err
        );
        process::exit(1);
    });
    if let Some(port) = cli.port {
        config.port = port;
    }

    match &cli.command {
        None | Some(Commands::Serve) => {
            if let Err(err) = server::serve(config).await {
                eprintln!("{} {:#}", "❌ Server stopped:".red(), err);
                process::exit(1);
            }
        }

        Some(Commands::AuthUrl) => {
            println!(
                "{}",
                build_authorization_url(&config.auth_url, &config.client_id, &config.redirect_uri)
            );
        }

        Some(Commands::Automations { token }) => {
            let access_token = AccessToken::new(token.as_str()).unwrap_or_else(|err| {
                report_error("reading the access token", &err);
                process::exit(1);
            });
            let client = MarketingCloudClient::try_from(config).unwrap_or_else(|err| {
                eprintln!("{} {}", "❌ Unable to build HTTP client:".red(), err);
                process::exit(1);
            });

            match get_automations(&client, &access_token).await {
                Ok(records) => match serde_json::to_string_pretty(&records) {
                    Ok(json) => println!("{}", json),
                    Err(err) => {
                        eprintln!("{} {}", "❌ Unable to serialize automations:".red(), err);
                        process::exit(1);
                    }
                },
                Err(err) => {
                    report_error("fetching automations", &err);
                    process::exit(1);
                }
            }
        }
    }
}
