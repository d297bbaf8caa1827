use crate::soap::deserialize_text;
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{Display, IntoStaticStr};

// Models for representing Marketing Cloud automations
// -------------------------------------------------------------------------------------------------

/// Sentinel used for every field the platform did not fill in
pub const NOT_AVAILABLE: &str = "N/A";

/// Only one business unit is supported at the moment
pub const BUSINESS_UNIT: &str = "Corporate";

/// Model for an Automation object exactly as it comes out of a Retrieve response.
///
/// Every field is optional since the partner API omits properties that have no value. Values are
/// kept as the platform's raw strings; nothing is interpreted here.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RawAutomationRecord {
    #[serde(rename = "Name", default, deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "deserialize_text")]
    pub description: Option<String>,
    #[serde(rename = "CustomerKey", default, deserialize_with = "deserialize_text")]
    pub customer_key: Option<String>,
    #[serde(rename = "IsActive", default, deserialize_with = "deserialize_text")]
    pub is_active: Option<String>,
    #[serde(rename = "CreatedDate", default, deserialize_with = "deserialize_text")]
    pub created_date: Option<String>,
    #[serde(rename = "ModifiedDate", default, deserialize_with = "deserialize_text")]
    pub modified_date: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "deserialize_text")]
    pub status: Option<String>,
    #[serde(rename = "ProgramID", default, deserialize_with = "deserialize_text")]
    pub program_id: Option<String>,
    #[serde(rename = "CategoryID", default, deserialize_with = "deserialize_text")]
    pub category_id: Option<String>,
    #[serde(rename = "LastRunTime", default, deserialize_with = "deserialize_text")]
    pub last_run_time: Option<String>,
    #[serde(rename = "ScheduledTime", default, deserialize_with = "deserialize_text")]
    pub scheduled_time: Option<String>,
    #[serde(rename = "LastSaveDate", default, deserialize_with = "deserialize_text")]
    pub last_save_date: Option<String>,
    #[serde(rename = "ModifiedBy", default, deserialize_with = "deserialize_text")]
    pub modified_by: Option<String>,
    #[serde(rename = "CreatedBy", default, deserialize_with = "deserialize_text")]
    pub created_by: Option<String>,
    #[serde(rename = "AutomationType", default, deserialize_with = "deserialize_text")]
    pub automation_type: Option<String>,
    #[serde(rename = "RecurrenceID", default, deserialize_with = "deserialize_text")]
    pub recurrence_id: Option<String>,
}

/// Model for an automation as it is handed to the dashboard.
///
/// All 17 fields are always set. `is_active` is the one exception to the sentinel rule: it is
/// passed through as the platform sent it (usually `"true"`/`"false"`), and serializes to `null`
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAutomationRecord {
    #[serde(rename = "BusinessUnit")]
    pub business_unit: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "CustomerKey")]
    pub customer_key: String,
    #[serde(rename = "IsActive")]
    pub is_active: Option<String>,
    #[serde(rename = "CreatedDate")]
    pub created_date: String,
    #[serde(rename = "ModifiedDate")]
    pub modified_date: String,
    #[serde(rename = "Status")]
    pub status: AutomationStatus,
    #[serde(rename = "ProgramID")]
    pub program_id: String,
    #[serde(rename = "CategoryID")]
    pub category_id: String,
    #[serde(rename = "LastRunTime")]
    pub last_run_time: String,
    #[serde(rename = "ScheduledTime")]
    pub scheduled_time: String,
    #[serde(rename = "LastSaveDate")]
    pub last_save_date: String,
    #[serde(rename = "ModifiedBy")]
    pub modified_by: String,
    #[serde(rename = "CreatedBy")]
    pub created_by: String,
    #[serde(rename = "AutomationType")]
    pub automation_type: String,
    #[serde(rename = "RecurrenceID")]
    pub recurrence_id: String,
}

/// Possible states of an automation, keyed by the numeric code the partner API reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum AutomationStatus {
    #[strum(serialize = "Error")]
    Error,
    #[strum(serialize = "Building Error")]
    BuildingError,
    #[strum(serialize = "Building")]
    Building,
    #[strum(serialize = "Ready")]
    Ready,
    #[strum(serialize = "Running")]
    Running,
    #[strum(serialize = "Paused")]
    Paused,
    #[strum(serialize = "Stopped")]
    Stopped,
    #[strum(serialize = "Scheduled")]
    Scheduled,
    #[strum(serialize = "Awaiting Trigger")]
    AwaitingTrigger,
    #[strum(serialize = "Inactive Trigger")]
    InactiveTrigger,
    #[strum(serialize = "Unknown")]
    Unknown,
}

impl AutomationStatus {
    /// Looks up a raw status code. The code is read as an integer, so `"02"` is `Ready`.
    /// Anything outside of `-1..=8` (including absent or non-integer values) is `Unknown`.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.and_then(|value| value.trim().parse::<i32>().ok()) {
            Some(-1) => AutomationStatus::Error,
            Some(0) => AutomationStatus::BuildingError,
            Some(1) => AutomationStatus::Building,
            Some(2) => AutomationStatus::Ready,
            Some(3) => AutomationStatus::Running,
            Some(4) => AutomationStatus::Paused,
            Some(5) => AutomationStatus::Stopped,
            Some(6) => AutomationStatus::Scheduled,
            Some(7) => AutomationStatus::AwaitingTrigger,
            Some(8) => AutomationStatus::InactiveTrigger,
            _ => AutomationStatus::Unknown,
        }
    }

    /// Human-readable label shown on the dashboard
    pub fn label(self) -> &'static str {
        self.into()
    }
}

impl Serialize for AutomationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Turns a platform timestamp into its display form.
///
/// `2024-03-01T12:30:00.000Z` becomes `2024-03-01, 12:30:00`. This is a pure string transform:
/// the first `T` is replaced by `", "` and everything from the first `.` on is dropped. Input
/// without a `T` or a `.` is passed through accordingly; no date validation happens.
pub fn format_date(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.is_empty() => {
            let display = value.replacen('T', ", ", 1);
            match display.split_once('.') {
                Some((head, _)) => head.to_owned(),
                None => display,
            }
        }
        _ => NOT_AVAILABLE.to_owned(),
    }
}

fn or_not_available(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

/// Maps a raw record into the shape the dashboard relies on. Never fails.
pub fn normalize(raw: RawAutomationRecord) -> NormalizedAutomationRecord {
    NormalizedAutomationRecord {
        business_unit: BUSINESS_UNIT.to_owned(),
        name: or_not_available(raw.name),
        description: or_not_available(raw.description),
        customer_key: or_not_available(raw.customer_key),
        is_active: raw.is_active,
        created_date: format_date(raw.created_date.as_deref()),
        modified_date: format_date(raw.modified_date.as_deref()),
        status: AutomationStatus::from_code(raw.status.as_deref()),
        program_id: or_not_available(raw.program_id),
        category_id: or_not_available(raw.category_id),
        last_run_time: format_date(raw.last_run_time.as_deref()),
        scheduled_time: format_date(raw.scheduled_time.as_deref()),
        last_save_date: format_date(raw.last_save_date.as_deref()),
        modified_by: or_not_available(raw.modified_by),
        created_by: or_not_available(raw.created_by),
        automation_type: or_not_available(raw.automation_type),
        recurrence_id: or_not_available(raw.recurrence_id),
    }
}

impl From<RawAutomationRecord> for NormalizedAutomationRecord {
    fn from(raw: RawAutomationRecord) -> Self {
        normalize(raw)
    }
}
