// Tool descriptions and argument parsing for the time-off tools
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::sap::parse_sap_date;

pub const BOOK_TIME_OFF: &str = "book_time_off";
pub const LIST_TIME_OFF_REQUESTS: &str = "list_time_off_requests";
pub const DELETE_TIME_OFF_REQUEST: &str = "delete_time_off_request";

const DATE_HINT: &str = "ISO 8601 date or date-time, e.g. '2024-07-01' or '2024-07-01T00:00:00Z'. Times without an offset are taken as UTC";

pub fn get_tools_description_json() -> Value {
    json!([
        {
            "name": BOOK_TIME_OFF,
            "description": "Book time off for an employee.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "userId": {
                        "type": "string",
                        "description": "Employee ID"
                    },
                    "startDate": {
                        "type": "string",
                        "description": format!("Start date of time off. {DATE_HINT}")
                    },
                    "endDate": {
                        "type": "string",
                        "description": format!("End date of time off. {DATE_HINT}")
                    }
                },
                "required": ["userId", "startDate", "endDate"]
            },
            "annotations": {
                "title": "Book Time Off",
                "readOnlyHint": false,
                "destructiveHint": false,
                "idempotentHint": false,
                "openWorldHint": true
            }
        },
        {
            "name": LIST_TIME_OFF_REQUESTS,
            "description": "List all time off requests for an employee.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "userId": {
                        "type": "string",
                        "description": "Employee ID"
                    },
                    "startDateFilter": {
                        "type": "string",
                        "description": format!("Optional: Start date filter (inclusive) - only show requests starting on or after this date. {DATE_HINT}")
                    },
                    "endDateFilter": {
                        "type": "string",
                        "description": format!("Optional: End date filter (inclusive) - only show requests ending on or before this date. {DATE_HINT}")
                    }
                },
                "required": ["userId"]
            },
            "annotations": {
                "title": "List Time Off Requests",
                "readOnlyHint": true,
                "destructiveHint": false,
                "idempotentHint": true,
                "openWorldHint": true
            }
        },
        {
            "name": DELETE_TIME_OFF_REQUEST,
            "description": "Delete a time off request by external code.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "externalCode": {
                        "type": "string",
                        "description": "External code of the time off request to delete"
                    }
                },
                "required": ["externalCode"]
            },
            "annotations": {
                "title": "Delete Time Off Request",
                "readOnlyHint": false,
                "destructiveHint": true,
                "idempotentHint": false,
                "openWorldHint": true
            }
        }
    ])
}

#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("Invalid params for {tool}: {source}")]
    Malformed {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid params for {tool}: '{field}' must not be empty")]
    Empty { tool: &'static str, field: &'static str },

    #[error("Invalid params for {tool}: '{field}' is not a valid date: {value}")]
    InvalidDate {
        tool: &'static str,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, PartialEq)]
pub struct BookTimeOffArgs {
    pub user_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub struct ListTimeOffArgs {
    pub user_id: String,
    pub start_date_filter: Option<DateTime<Utc>>,
    pub end_date_filter: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq)]
pub struct DeleteTimeOffArgs {
    pub external_code: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBookArgs {
    user_id: String,
    start_date: String,
    end_date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawListArgs {
    user_id: String,
    #[serde(default)]
    start_date_filter: Option<String>,
    #[serde(default)]
    end_date_filter: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDeleteArgs {
    external_code: String,
}

impl BookTimeOffArgs {
    pub fn parse(arguments: Value) -> Result<Self, ArgumentError> {
        let tool = BOOK_TIME_OFF;
        let raw: RawBookArgs =
            serde_json::from_value(arguments).map_err(|source| ArgumentError::Malformed { tool, source })?;
        Ok(BookTimeOffArgs {
            user_id: non_empty(tool, "userId", raw.user_id)?,
            start_date: required_date(tool, "startDate", &raw.start_date)?,
            end_date: required_date(tool, "endDate", &raw.end_date)?,
        })
    }
}

impl ListTimeOffArgs {
    pub fn parse(arguments: Value) -> Result<Self, ArgumentError> {
        let tool = LIST_TIME_OFF_REQUESTS;
        let raw: RawListArgs =
            serde_json::from_value(arguments).map_err(|source| ArgumentError::Malformed { tool, source })?;
        Ok(ListTimeOffArgs {
            user_id: non_empty(tool, "userId", raw.user_id)?,
            start_date_filter: optional_date(tool, "startDateFilter", raw.start_date_filter.as_deref())?,
            end_date_filter: optional_date(tool, "endDateFilter", raw.end_date_filter.as_deref())?,
        })
    }
}

impl DeleteTimeOffArgs {
    pub fn parse(arguments: Value) -> Result<Self, ArgumentError> {
        let tool = DELETE_TIME_OFF_REQUEST;
        let raw: RawDeleteArgs =
            serde_json::from_value(arguments).map_err(|source| ArgumentError::Malformed { tool, source })?;
        Ok(DeleteTimeOffArgs {
            external_code: non_empty(tool, "externalCode", raw.external_code)?,
        })
    }
}

fn non_empty(tool: &'static str, field: &'static str, value: String) -> Result<String, ArgumentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ArgumentError::Empty { tool, field });
    }
    Ok(trimmed.to_string())
}

fn required_date(tool: &'static str, field: &'static str, value: &str) -> Result<DateTime<Utc>, ArgumentError> {
    parse_sap_date(value).ok_or_else(|| ArgumentError::InvalidDate {
        tool,
        field,
        value: value.to_string(),
    })
}

// Blank optional filters count as absent
fn optional_date(
    tool: &'static str,
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, ArgumentError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => required_date(tool, field, value).map(Some),
    }
}
