// OData payload encoding and response decoding for EmployeeTime
use serde_json::{json, Value};
use uuid::Uuid;

use crate::sap::{date_field, decimal_field, string_field, to_sap_date};
use crate::types::{TimeOffBookingRequest, TimeOffRecord, APPROVAL_STATUS_PENDING, TIME_TYPE_VACATION};

pub const EXTERNAL_CODE_PREFIX: &str = "REQ_";
pub const EXTERNAL_CODE_LEN: usize = 15;

pub fn generate_external_code() -> String {
    let token = Uuid::new_v4().simple().to_string();
    let mut code = format!("{EXTERNAL_CODE_PREFIX}{token}");
    code.truncate(EXTERNAL_CODE_LEN);
    code
}

pub fn booking_payload(base_url: &str, request: &TimeOffBookingRequest, external_code: &str) -> Value {
    json!({
        "__metadata": {
            "uri": format!("{base_url}/EmployeeTime('{external_code}')"),
            "type": "SFOData.EmployeeTime"
        },
        "userId": request.user_id,
        "timeType": TIME_TYPE_VACATION,
        "startDate": to_sap_date(&request.start_date),
        "endDate": to_sap_date(&request.end_date),
        "approvalStatus": APPROVAL_STATUS_PENDING,
        "externalCode": external_code,
        "userIdNav": {
            "__metadata": {
                "uri": format!("{base_url}/User('{}')", request.user_id),
                "type": "SFOData.User"
            }
        },
        "timeTypeNav": {
            "__metadata": {
                "uri": format!("{base_url}/TimeType('{TIME_TYPE_VACATION}')"),
                "type": "SFOData.TimeType"
            }
        }
    })
}

// Missing `d.results` decodes to an empty list; only invalid JSON is an error
pub fn decode_time_off_list(body: &str) -> Result<Vec<TimeOffRecord>, serde_json::Error> {
    let document: Value = serde_json::from_str(body)?;
    let records = document
        .get("d")
        .and_then(|d| d.get("results"))
        .and_then(Value::as_array)
        .map(|results| results.iter().map(decode_time_off_record).collect())
        .unwrap_or_default();
    Ok(records)
}

fn decode_time_off_record(item: &Value) -> TimeOffRecord {
    TimeOffRecord {
        external_code: string_field(item, "externalCode"),
        user_id: string_field(item, "userId"),
        time_type: string_field(item, "timeType"),
        start_date: date_field(item, "startDate"),
        end_date: date_field(item, "endDate"),
        approval_status: string_field(item, "approvalStatus"),
        comment: string_field(item, "comment"),
        quantity_in_days: decimal_field(item, "quantityInDays"),
        quantity_in_hours: decimal_field(item, "quantityInHours"),
        created_date: date_field(item, "createdDate"),
        last_modified_date: date_field(item, "lastModifiedDate"),
    }
}

// d[0] of an upsert response
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertStatus {
    pub status: String,
    pub edit_status: String,
    pub message: String,
}

pub fn decode_upsert_status(body: &str) -> Option<UpsertStatus> {
    let document: Value = serde_json::from_str(body).ok()?;
    let entry = document.get("d")?.as_array()?.first()?;
    Some(UpsertStatus {
        status: string_field(entry, "status"),
        edit_status: string_field(entry, "editStatus"),
        message: string_field(entry, "message"),
    })
}
