// Typed results handed back to MCP callers
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

pub const TIME_TYPE_VACATION: &str = "TT_VAC_REC";
pub const APPROVAL_STATUS_PENDING: &str = "PENDING";

#[derive(Debug, Clone)]
pub struct TimeOffBookingRequest {
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// One `EmployeeTime` entry decoded from a list response.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeOffRecord {
    pub external_code: String,
    pub user_id: String,
    pub time_type: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub approval_status: String,
    pub comment: String,
    pub quantity_in_days: Option<Decimal>,
    pub quantity_in_hours: Option<Decimal>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookTimeOffResponse {
    pub status_code: u16,
    pub call_successful: bool,
    pub content: String,
    pub external_code: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTimeOffResponse {
    pub status_code: u16,
    pub call_successful: bool,
    pub content: String,
    pub external_code: String,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListTimeOffResponse {
    pub status_code: u16,
    pub call_successful: bool,
    pub time_off_requests: Vec<TimeOffRecord>,
    pub request_count: usize,
    /// Only set when a successful response carried a body that was not valid JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ListTimeOffResponse {
    pub fn new(status_code: u16, call_successful: bool, time_off_requests: Vec<TimeOffRecord>) -> Self {
        ListTimeOffResponse {
            status_code,
            call_successful,
            request_count: time_off_requests.len(),
            time_off_requests,
            error_message: None,
        }
    }

    pub fn decode_failure(status_code: u16, message: String) -> Self {
        ListTimeOffResponse {
            status_code,
            call_successful: false,
            time_off_requests: Vec::new(),
            request_count: 0,
            error_message: Some(message),
        }
    }
}
