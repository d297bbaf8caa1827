use crate::config::DashboardConfig;
use crate::models::auth::AccessToken;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Error, Response};
use std::time::Duration;

/// Model for the Marketing Cloud client object
#[derive(Debug)]
pub struct MarketingCloudClient {
    pub config: DashboardConfig,
    pub client: reqwest::Client,
}

/// A SOAP interface that leverages `reqwest`.
#[async_trait]
pub trait SoapConnector {
    async fn perform_soap_request(
        &self,
        action: &str,
        access_token: &AccessToken,
        envelope: String,
    ) -> Result<Response, Error>;
}

#[async_trait]
impl SoapConnector for MarketingCloudClient {
    /// Posts a SOAP envelope with all necessary headers to authenticate with Marketing Cloud.
    ///
    /// # Arguments
    ///
    /// * `&self`
    /// * `action` - Value of the `SOAPAction` header, e.g. `Retrieve`
    /// * `access_token` - Bearer token of the current session
    /// * `envelope` - Complete SOAP envelope; it has to carry the token in its header as well
    async fn perform_soap_request(
        &self,
        action: &str,
        access_token: &AccessToken,
        envelope: String,
    ) -> Result<Response, Error> {
        let response = self
            .client
            .post(&self.config.soap_endpoint)
            .header(CONTENT_TYPE, "text/xml;charset=UTF-8")
            .header("SOAPAction", action)
            .header(AUTHORIZATION, format!("Bearer {}", access_token.secret()))
            .body(envelope)
            .send()
            .await?;
        Ok(response)
    }
}

impl TryFrom<DashboardConfig> for MarketingCloudClient {
    type Error = Error;

    /// Every outgoing call is bounded by the configured timeout.
    fn try_from(config: DashboardConfig) -> Result<Self, Self::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(MarketingCloudClient {
            config,
            client: http_client,
        })
    }
}
