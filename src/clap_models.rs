use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(
author,
version,
about,
long_about = None
)]
#[clap(propagate_version = true)]
pub struct Cli {
    /// Path to JSON config file
    #[clap(short, long, value_parser, default_value_t = String::from("./autodash.json"), env = "AUTODASH_CONFIG")]
    pub config: String,

    /// Port the web server listens on; overrides the config file
    #[clap(short, long, value_parser, global = true, env = "AUTODASH_PORT")]
    pub port: Option<u16>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the dashboard web server (default)
    Serve,

    /// Print the OAuth authorization URL to open in a browser
    AuthUrl,

    /// Fetch all active automations once and print them as JSON
    Automations {
        /// Access token of an authenticated session
        #[clap(long, value_parser, env = "AUTODASH_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },
}
