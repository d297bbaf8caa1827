//! Server-side rendered HTML pages. No JavaScript.

use crate::models::automation::NormalizedAutomationRecord;
use askama::Template;
use axum::response::{Html, IntoResponse, Response};

/// Landing page with the login link.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

impl IntoResponse for IndexTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

/// Table of automations, showing name and status.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub data: Vec<NormalizedAutomationRecord>,
}

impl IntoResponse for DashboardTemplate {
    fn into_response(self) -> Response {
        Html(self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::automation::{normalize, RawAutomationRecord};

    #[test]
    fn renders_name_and_status() {
        let record = normalize(RawAutomationRecord {
            name: Some("Weekly Report & Export".to_owned()),
            status: Some("4".to_owned()),
            ..Default::default()
        });
        let html = DashboardTemplate { data: vec![record] }.to_string();

        assert!(html.contains("<td>Weekly Report &amp; Export</td><td>Paused</td>"));
        assert!(!html.contains("No active automations"));
    }

    #[test]
    fn escapes_markup_in_names() {
        let record = normalize(RawAutomationRecord {
            name: Some("<script>alert(1)</script>".to_owned()),
            ..Default::default()
        });
        let html = DashboardTemplate { data: vec![record] }.to_string();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn renders_empty_state() {
        let html = DashboardTemplate { data: Vec::new() }.to_string();
        assert!(html.contains("No active automations"));
    }

    #[test]
    fn index_links_to_login() {
        assert!(IndexTemplate.to_string().contains("href=\"/login\""));
    }
}
