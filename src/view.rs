// Human-readable summaries of tool results
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::codec::decode_upsert_status;
use crate::types::{BookTimeOffResponse, DeleteTimeOffResponse, ListTimeOffResponse, TimeOffRecord};

/// Renders a result as the text returned in the MCP `content` block.
pub trait McpView {
    fn to_mcp_view(&self) -> String;
}

impl McpView for BookTimeOffResponse {
    fn to_mcp_view(&self) -> String {
        status_view(self.call_successful, self.status_code, &self.content)
    }
}

pub fn status_view(call_successful: bool, status_code: u16, body: &str) -> String {
    if !call_successful {
        return format!("Failed to call the API, StatusCode: {status_code}");
    }
    match decode_upsert_status(body) {
        Some(entry) => format!(
            "Status: {} / EditStatus: {} / Message: {}",
            entry.status, entry.edit_status, entry.message
        ),
        None => "No valid response found.".to_string(),
    }
}

impl McpView for DeleteTimeOffResponse {
    fn to_mcp_view(&self) -> String {
        if !self.call_successful {
            return format!(
                "Failed to call the Delete Time Off endpoint, StatusCode: {}",
                self.status_code
            );
        }
        format!("Successfully deleted Time Off with ExternalCode: {}", self.external_code)
    }
}

impl McpView for ListTimeOffResponse {
    fn to_mcp_view(&self) -> String {
        if !self.call_successful {
            let mut line = format!(
                "Failed to call the List Time Off endpoint, StatusCode: {}",
                self.status_code
            );
            if let Some(message) = &self.error_message {
                line.push_str(": ");
                line.push_str(message);
            }
            return line;
        }

        if self.time_off_requests.is_empty() {
            return "No Time Off Requests found.".to_string();
        }

        self.time_off_requests
            .iter()
            .map(record_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn record_line(record: &TimeOffRecord) -> String {
    format!(
        "ExternalCode: {} / UserId: {} / TimeType: {} / StartDate: {} / EndDate: {} / ApprovalStatus: {} / Comment: {} / QuantityInDays: {} / QuantityInHours: {} / CreatedDate: {} / LastModifiedDate: {}",
        record.external_code,
        record.user_id,
        record.time_type,
        date_text(record.start_date.as_ref()),
        date_text(record.end_date.as_ref()),
        record.approval_status,
        record.comment,
        decimal_text(record.quantity_in_days.as_ref()),
        decimal_text(record.quantity_in_hours.as_ref()),
        date_text(record.created_date.as_ref()),
        date_text(record.last_modified_date.as_ref()),
    )
}

fn date_text(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn decimal_text(value: Option<&Decimal>) -> String {
    value.map(Decimal::to_string).unwrap_or_default()
}
