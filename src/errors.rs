use colored::*;
use log::error;
use thiserror::Error;

/// Everything that can go wrong while turning an authorization code into dashboard rows.
///
/// Each variant is terminal for the request it occurred in; nothing is retried.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The token endpoint rejected the authorization code or could not be reached
    #[error("token exchange failed ({}): {body}", describe_status(.status))]
    AuthExchange { status: Option<u16>, body: String },

    /// The SOAP Retrieve call failed, including SOAP faults and timeouts
    #[error("automation retrieval failed ({}): {body}", describe_status(.status))]
    Retrieval { status: Option<u16>, body: String },

    /// The response XML did not have the expected Retrieve response shape
    #[error("malformed SOAP response: {0}")]
    MalformedResponse(String),

    /// No access token was available for the request
    #[error("no access token available")]
    MissingAccessToken,
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "no response".to_owned(),
    }
}

impl DashboardError {
    /// Builds a retrieval error from a `reqwest` transport failure.
    pub fn retrieval_transport(err: &reqwest::Error) -> Self {
        DashboardError::Retrieval {
            status: err.status().map(|s| s.as_u16()),
            body: transport_message(err),
        }
    }

    /// Builds a token exchange error from a `reqwest` transport failure.
    pub fn auth_transport(err: &reqwest::Error) -> Self {
        DashboardError::AuthExchange {
            status: err.status().map(|s| s.as_u16()),
            body: transport_message(err),
        }
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    }
}

/// Prints a failed pipeline run to stderr and the log.
///
/// # Arguments
///
/// * `context` - What was being attempted, e.g. "fetching automations"
/// * `err` - The error that ended the run
pub fn report_error(context: &str, err: &DashboardError) {
    error!("Error {}: {}", context, err);
    eprintln!(
        "{}\n{}",
        format!("❌ Error {}; check output below.", context)
            .red()
            .bold(),
        err.to_string().magenta()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_upstream_details() {
        let err = DashboardError::Retrieval {
            status: Some(500),
            body: "<soap:Fault/>".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "automation retrieval failed (HTTP 500): <soap:Fault/>"
        );

        let err = DashboardError::AuthExchange {
            status: None,
            body: "connection refused".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "token exchange failed (no response): connection refused"
        );
    }
}
