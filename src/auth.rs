use crate::client::MarketingCloudClient;
use crate::errors::DashboardError;
use crate::models::auth::{AccessToken, BearerResponse, TokenRequest};
use log::{debug, error, info};

/// Builds the URL the browser is sent to in order to start the authorization-code flow.
///
/// # Arguments
///
/// * `auth_base_url` - Authorization endpoint of the tenant
/// * `client_id` - ID of the installed package
/// * `redirect_uri` - Callback URL; it is percent-encoded into the query string
pub fn build_authorization_url(auth_base_url: &str, client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}",
        auth_base_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri)
    )
}

/// Exchanges a one-time authorization code for an access token.
///
/// The code is single-use, so a failed exchange is never retried.
///
/// # Arguments
///
/// * `client` - A reference to a MarketingCloudClient instance
/// * `code` - Authorization code from the OAuth callback
///
/// # Performed API Request
///
/// ```
/// POST https://{subdomain}.auth.marketingcloudapis.com/v2/token
/// ```
pub async fn exchange_code_for_token(
    client: &MarketingCloudClient,
    code: &str,
) -> Result<AccessToken, DashboardError> {
    let config = &client.config;
    let request = TokenRequest {
        grant_type: "authorization_code",
        code,
        client_id: &config.client_id,
        client_secret: &config.client_secret,
        redirect_uri: &config.redirect_uri,
    };
    debug!("exchanging authorization code at {}", config.token_url);

    let response = client
        .client
        .post(&config.token_url)
        .json(&request)
        .send()
        .await
        .map_err(|err| {
            error!("Error getting token: {}", err);
            DashboardError::auth_transport(&err)
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| DashboardError::auth_transport(&err))?;

    if !status.is_success() {
        error!("Error getting token: {} {}", status, body);
        return Err(DashboardError::AuthExchange {
            status: Some(status.as_u16()),
            body,
        });
    }

    let bearer_response: BearerResponse =
        serde_json::from_str(&body).map_err(|err| DashboardError::AuthExchange {
            status: Some(status.as_u16()),
            body: format!("unable to parse token response: {}", err),
        })?;

    let token = bearer_response
        .access_token
        .ok_or_else(|| DashboardError::AuthExchange {
            status: Some(status.as_u16()),
            body: "token response has no access_token".to_owned(),
        })
        .and_then(|value| {
            AccessToken::new(value).map_err(|_| DashboardError::AuthExchange {
                status: Some(status.as_u16()),
                body: "token response has an empty access_token".to_owned(),
            })
        })?;

    match bearer_response.expires_in {
        Some(seconds) => info!("obtained access token, valid for {}s", seconds),
        None => info!("obtained access token"),
    }
    Ok(token)
}
