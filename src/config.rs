use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::fs;

/// Model for a Marketing Cloud connection configuration
#[derive(Clone, Deserialize)]
pub struct DashboardConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Authorization endpoint the browser is sent to, e.g. `https://<subdomain>.auth.marketingcloudapis.com/v2/authorize`
    pub auth_url: String,
    /// Token endpoint used for the authorization-code exchange
    pub token_url: String,
    pub redirect_uri: String,
    /// SOAP service endpoint, e.g. `https://<subdomain>.soap.marketingcloudapis.com/Service.asmx`
    pub soap_endpoint: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// default port to listen on
fn default_port() -> u16 {
    3000
}
/// default timeout for outgoing requests
fn default_request_timeout() -> u64 {
    30
}
/// default directory for static assets
fn default_static_dir() -> String {
    "public".to_owned()
}

impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("soap_endpoint", &self.soap_endpoint)
            .field("port", &self.port)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl DashboardConfig {
    /// Reads a dashboard configuration from a JSON file
    ///
    /// # Arguments
    ///
    /// * `path` - String slice that holds the path to the JSON config file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Unable to find config at path '{}'", path))?;
        Self::from_json(data.as_str()).with_context(|| format!("Invalid config at path '{}'", path))
    }

    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(data).context("Invalid JSON format")?;
        Ok(config)
    }
}
