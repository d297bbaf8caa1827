use crate::client::{MarketingCloudClient, SoapConnector};
use crate::errors::DashboardError;
use crate::models::auth::AccessToken;
use crate::models::automation::{normalize, NormalizedAutomationRecord, RawAutomationRecord};
use crate::soap::{build_retrieve_envelope, child, coerce_to_sequence, parse_document, text_of};
use log::{debug, error, warn};
use serde_json::Value;

/// Retrieves all active automations as raw SOAP XML.
///
/// # Arguments
///
/// * `client` - A reference to a MarketingCloudClient instance
/// * `access_token` - Bearer token of the current session
///
/// # Performed API Request
///
/// ```
/// POST https://{subdomain}.soap.marketingcloudapis.com/Service.asmx
/// SOAPAction: Retrieve
/// ```
pub async fn retrieve_automations(
    client: &MarketingCloudClient,
    access_token: &AccessToken,
) -> Result<String, DashboardError> {
    let endpoint = client.config.soap_endpoint.as_str();
    debug!("retrieving active automations from {}", endpoint);
    let envelope = build_retrieve_envelope(endpoint, access_token);

    let response = client
        .perform_soap_request("Retrieve", access_token, envelope)
        .await
        .map_err(|err| {
            error!("Error fetching data from Marketing Cloud: {}", err);
            DashboardError::retrieval_transport(&err)
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        error!("Error reading Marketing Cloud response: {}", err);
        DashboardError::retrieval_transport(&err)
    })?;

    if !status.is_success() {
        // SOAP faults are delivered with HTTP 500
        error!("Error fetching data from Marketing Cloud: {} {}", status, body);
        let body = if body.is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            body
        };
        return Err(DashboardError::Retrieval {
            status: Some(status.as_u16()),
            body,
        });
    }

    Ok(body)
}

/// Pulls the raw automation records out of a Retrieve response.
///
/// The path Envelope → Body → RetrieveResponseMsg must exist; zero `Results` elements is a valid
/// answer and yields an empty list. An `OverallStatus` starting with `Error` is a failed Retrieve
/// even though the platform answers it with HTTP 200.
pub fn extract_results(xml_payload: &str) -> Result<Vec<RawAutomationRecord>, DashboardError> {
    let document = parse_document(xml_payload)?;
    let envelope = child(&document, "Envelope")?;
    let body = child(envelope, "Body")?;
    let message = child(body, "RetrieveResponseMsg")?;

    match message.get("OverallStatus").and_then(text_of) {
        Some(overall) if overall.starts_with("Error") => {
            error!("Retrieve failed with OverallStatus '{}'", overall);
            return Err(DashboardError::Retrieval {
                status: Some(200),
                body: overall,
            });
        }
        Some(overall) if overall != "OK" => {
            warn!("Retrieve finished with OverallStatus '{}'", overall)
        }
        _ => {}
    }

    coerce_to_sequence(message.get("Results").cloned())
        .into_iter()
        .map(|result| match result {
            // <Results/> carries no properties at all
            Value::String(text) if text.is_empty() => Ok(RawAutomationRecord::default()),
            result => serde_json::from_value::<RawAutomationRecord>(result).map_err(|err| {
                DashboardError::MalformedResponse(format!("unexpected <Results> shape: {}", err))
            }),
        })
        .collect()
}

/// Runs the whole pipeline for one request: retrieve, extract, normalize.
pub async fn get_automations(
    client: &MarketingCloudClient,
    access_token: &AccessToken,
) -> Result<Vec<NormalizedAutomationRecord>, DashboardError> {
    let payload = retrieve_automations(client, access_token).await?;
    let records = extract_results(&payload)?;
    debug!("retrieved {} automations", records.len());
    Ok(records.into_iter().map(normalize).collect())
}
