use crate::errors::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Body of the authorization-code exchange that is sent to the token endpoint
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'a str,
    pub code: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub redirect_uri: &'a str,
}

/// Helper struct that is used to deserialize the token endpoint's answer
#[derive(Deserialize)]
pub struct BearerResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Opaque bearer credential for one authenticated session.
///
/// The value is wiped from memory when dropped and never shows up in `Debug` output, so the
/// token can't leak through logging by accident.
#[derive(Clone, PartialEq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wraps a token; blank values are rejected before they can reach any request.
    pub fn new(value: impl Into<String>) -> Result<Self, DashboardError> {
        let value = Zeroizing::new(value.into());
        if value.trim().is_empty() {
            return Err(DashboardError::MissingAccessToken);
        }
        Ok(AccessToken(value))
    }

    pub fn secret(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::read_json_from_file;

    #[test]
    fn deserialize_bearer_response() {
        let vobj: BearerResponse =
            read_json_from_file("test/test_auth_bearer_response.json").unwrap();
        assert_eq!(vobj.access_token.as_deref(), Some("das.ist.ein.token"));
        assert_eq!(vobj.expires_in, Some(1079));
    }

    #[test]
    fn serialize_token_request() {
        let request = TokenRequest {
            grant_type: "authorization_code",
            code: "one-time-code",
            client_id: "abc123",
            client_secret: "s3cr3t",
            redirect_uri: "https://app.example/cb",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["grant_type"], "authorization_code");
        assert_eq!(json["code"], "one-time-code");
        assert_eq!(json["redirect_uri"], "https://app.example/cb");
    }

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(matches!(
            AccessToken::new(""),
            Err(DashboardError::MissingAccessToken)
        ));
        assert!(matches!(
            AccessToken::new("   "),
            Err(DashboardError::MissingAccessToken)
        ));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let token = AccessToken::new("das.ist.ein.token").unwrap();
        let printed = format!("{:?}", token);
        assert!(!printed.contains("das.ist.ein.token"));
        assert_eq!(token.secret(), "das.ist.ein.token");
    }
}
