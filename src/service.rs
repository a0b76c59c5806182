// Outbound calls to the SuccessFactors EmployeeTime OData API
use chrono::{DateTime, Utc};
use reqwest::{Client, Response};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::codec::{booking_payload, decode_time_off_list, generate_external_code};
use crate::config::PlatformConfig;
use crate::types::{
    BookTimeOffResponse, DeleteTimeOffResponse, ListTimeOffResponse, TimeOffBookingRequest,
};

const LIST_SELECT_FIELDS: &str = "externalCode,userId,timeType,startDate,endDate,approvalStatus,comment,quantityInDays,quantityInHours,createdDate,lastModifiedDate";
const LIST_ORDER_BY: &str = "startDate desc";

#[derive(Debug, thiserror::Error)]
pub enum TimeOffError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{operation} request to SuccessFactors failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {operation} response body: {source}")]
    Body {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Non-2xx answers come back as data with `call_successful == false`;
/// `Err` means no HTTP response was obtained at all.
#[derive(Clone)]
pub struct TimeOffService {
    config: Arc<PlatformConfig>,
    http_client: Client,
}

impl TimeOffService {
    pub fn new(config: Arc<PlatformConfig>) -> Result<Self, TimeOffError> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(TimeOffError::Client)?;
        Ok(Self { config, http_client })
    }

    pub async fn book_time_off(
        &self,
        user_id: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<BookTimeOffResponse, TimeOffError> {
        const OPERATION: &str = "book";

        let external_code = generate_external_code();
        let request = TimeOffBookingRequest {
            user_id: user_id.to_string(),
            start_date,
            end_date,
        };
        let payload = booking_payload(&self.config.base_url, &request, &external_code);
        let url = format!("{}/upsert?workflowConfirmed=true&$format=json", self.config.base_url);
        debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| transport_error(OPERATION, source))?;

        let (status_code, call_successful, content) = read_response(OPERATION, response).await?;
        info!(
            "Booked time off for user {} as {}: status {}",
            user_id, external_code, status_code
        );

        Ok(BookTimeOffResponse {
            status_code,
            call_successful,
            content,
            external_code,
        })
    }

    pub async fn list_time_off_requests(
        &self,
        user_id: &str,
        start_date_filter: Option<DateTime<Utc>>,
        end_date_filter: Option<DateTime<Utc>>,
    ) -> Result<ListTimeOffResponse, TimeOffError> {
        const OPERATION: &str = "list";

        let filter = build_filter(user_id, start_date_filter.as_ref(), end_date_filter.as_ref());
        let url = list_url(&self.config.base_url, &filter);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .send()
            .await
            .map_err(|source| transport_error(OPERATION, source))?;

        let (status_code, call_successful, content) = read_response(OPERATION, response).await?;
        if !call_successful {
            return Ok(ListTimeOffResponse::new(status_code, false, Vec::new()));
        }
        if content.trim().is_empty() {
            return Ok(ListTimeOffResponse::new(status_code, true, Vec::new()));
        }

        match decode_time_off_list(&content) {
            Ok(records) => {
                info!("Listed {} time off requests for user {}", records.len(), user_id);
                Ok(ListTimeOffResponse::new(status_code, true, records))
            }
            Err(e) => {
                warn!("List response for user {} was not valid JSON: {}", user_id, e);
                Ok(ListTimeOffResponse::decode_failure(
                    status_code,
                    format!("Failed to parse JSON response: {e}"),
                ))
            }
        }
    }

    pub async fn delete_time_off_request(
        &self,
        external_code: &str,
    ) -> Result<DeleteTimeOffResponse, TimeOffError> {
        const OPERATION: &str = "delete";

        let url = delete_url(&self.config.base_url, external_code);
        debug!("DELETE {}", url);

        let response = self
            .http_client
            .delete(&url)
            .header("apikey", &self.config.api_key)
            .send()
            .await
            .map_err(|source| transport_error(OPERATION, source))?;

        let (status_code, call_successful, content) = read_response(OPERATION, response).await?;
        info!("Deleted time off {}: status {}", external_code, status_code);

        Ok(DeleteTimeOffResponse {
            status_code,
            call_successful,
            content,
            external_code: external_code.to_string(),
        })
    }
}

fn transport_error(operation: &'static str, source: reqwest::Error) -> TimeOffError {
    error!("SuccessFactors {} request failed: {}", operation, source);
    TimeOffError::Transport { operation, source }
}

async fn read_response(
    operation: &'static str,
    response: Response,
) -> Result<(u16, bool, String), TimeOffError> {
    let status = response.status();
    if !status.is_success() {
        warn!("SuccessFactors {} returned status {}", operation, status.as_u16());
    }
    let content = response
        .text()
        .await
        .map_err(|source| TimeOffError::Body { operation, source })?;
    Ok((status.as_u16(), status.is_success(), content))
}

// OData string literals double their single quotes
fn odata_literal(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn build_filter(
    user_id: &str,
    start_date_filter: Option<&DateTime<Utc>>,
    end_date_filter: Option<&DateTime<Utc>>,
) -> String {
    let mut parts = vec![format!("userId eq '{}'", odata_literal(user_id))];
    if let Some(start) = start_date_filter {
        parts.push(format!("startDate ge '{}'", start.format("%Y-%m-%d")));
    }
    if let Some(end) = end_date_filter {
        parts.push(format!("endDate le '{}'", end.format("%Y-%m-%d")));
    }
    parts.join(" and ")
}

pub fn list_url(base_url: &str, filter: &str) -> String {
    format!(
        "{}/EmployeeTime?$filter={}&$select={}&$orderby={}&$format=json",
        base_url,
        urlencoding::encode(filter),
        LIST_SELECT_FIELDS,
        urlencoding::encode(LIST_ORDER_BY)
    )
}

pub fn delete_url(base_url: &str, external_code: &str) -> String {
    format!(
        "{}/EmployeeTime('{}')",
        base_url,
        urlencoding::encode(&odata_literal(external_code))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_platform_stub, unreachable_service};
    use axum::http::StatusCode;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn filter_with_user_only() {
        assert_eq!(build_filter("U1", None, None), "userId eq 'U1'");
    }

    #[test]
    fn filter_with_both_dates() {
        assert_eq!(
            build_filter("U1", Some(&date(2024, 1, 1)), Some(&date(2024, 1, 31))),
            "userId eq 'U1' and startDate ge '2024-01-01' and endDate le '2024-01-31'"
        );
    }

    #[test]
    fn filter_with_end_date_only() {
        assert_eq!(
            build_filter("U1", None, Some(&date(2024, 1, 31))),
            "userId eq 'U1' and endDate le '2024-01-31'"
        );
    }

    #[test]
    fn filter_escapes_quotes_in_user_id() {
        assert_eq!(build_filter("O'Brien", None, None), "userId eq 'O''Brien'");
    }

    #[test]
    fn list_url_encodes_filter_and_order() {
        assert_eq!(
            list_url("https://sf.example/odata/v2", "userId eq 'U1'"),
            "https://sf.example/odata/v2/EmployeeTime?$filter=userId%20eq%20%27U1%27&$select=externalCode,userId,timeType,startDate,endDate,approvalStatus,comment,quantityInDays,quantityInHours,createdDate,lastModifiedDate&$orderby=startDate%20desc&$format=json"
        );
    }

    #[test]
    fn delete_url_addresses_entity_by_key() {
        assert_eq!(
            delete_url("https://sf.example/odata/v2", "REQ_0123456789a"),
            "https://sf.example/odata/v2/EmployeeTime('REQ_0123456789a')"
        );
    }

    #[tokio::test]
    async fn book_posts_upsert_with_api_key() {
        let stub = spawn_platform_stub(
            StatusCode::OK,
            r#"{"d":[{"status":"OK","editStatus":"UPSERTED","message":null}]}"#,
        )
        .await;

        let result = stub
            .service()
            .book_time_off("U1", date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();

        assert!(result.call_successful);
        assert_eq!(result.status_code, 200);
        assert_eq!(result.external_code.len(), 15);
        assert!(result.content.contains("UPSERTED"));

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/odata/v2/upsert");
        assert_eq!(request.query.as_deref(), Some("workflowConfirmed=true&$format=json"));
        assert_eq!(request.api_key.as_deref(), Some("test-key"));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["externalCode"], result.external_code.as_str());
        assert_eq!(body["startDate"], "/Date(1704067200000)/");
        assert_eq!(body["__metadata"]["type"], "SFOData.EmployeeTime");
    }

    #[tokio::test]
    async fn book_failure_still_returns_external_code() {
        let stub = spawn_platform_stub(StatusCode::BAD_REQUEST, "bad payload").await;

        let result = stub
            .service()
            .book_time_off("U1", date(2024, 1, 1), date(2024, 1, 5))
            .await
            .unwrap();

        assert!(!result.call_successful);
        assert_eq!(result.status_code, 400);
        assert_eq!(result.content, "bad payload");
        assert!(result.external_code.starts_with("REQ_"));
    }

    #[tokio::test]
    async fn list_decodes_records_and_sends_query() {
        let stub = spawn_platform_stub(
            StatusCode::OK,
            r#"{"d":{"results":[
                {"externalCode":"X1","userId":"U1","timeType":"TT_VAC_REC","startDate":"/Date(1704067200000)/","quantityInDays":"5"},
                {"externalCode":"X2","userId":"U1"}
            ]}}"#,
        )
        .await;

        let result = stub
            .service()
            .list_time_off_requests("U1", Some(date(2024, 1, 1)), None)
            .await
            .unwrap();

        assert!(result.call_successful);
        assert_eq!(result.request_count, 2);
        assert_eq!(result.time_off_requests[0].external_code, "X1");
        assert_eq!(result.time_off_requests[0].start_date, Some(date(2024, 1, 1)));
        assert!(result.error_message.is_none());

        let requests = stub.requests();
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/odata/v2/EmployeeTime");
        let query = requests[0].query.clone().unwrap_or_default();
        assert!(query.starts_with(
            "$filter=userId%20eq%20%27U1%27%20and%20startDate%20ge%20%272024-01-01%27&$select="
        ));
        assert!(query.ends_with("&$orderby=startDate%20desc&$format=json"));
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn list_malformed_json_is_a_logical_failure() {
        let stub = spawn_platform_stub(StatusCode::OK, "{\"d\": {\"results\": [").await;

        let result = stub
            .service()
            .list_time_off_requests("U1", None, None)
            .await
            .unwrap();

        assert!(!result.call_successful);
        assert_eq!(result.status_code, 200);
        assert!(result.time_off_requests.is_empty());
        let message = result.error_message.unwrap_or_default();
        assert!(message.starts_with("Failed to parse JSON response: "));
    }

    #[tokio::test]
    async fn list_http_failure_skips_decoding() {
        let stub = spawn_platform_stub(StatusCode::INTERNAL_SERVER_ERROR, "{\"d\":{\"results\":[{}]}}").await;

        let result = stub
            .service()
            .list_time_off_requests("U1", None, None)
            .await
            .unwrap();

        assert!(!result.call_successful);
        assert_eq!(result.status_code, 500);
        assert!(result.time_off_requests.is_empty());
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn list_empty_body_is_empty_result() {
        let stub = spawn_platform_stub(StatusCode::OK, "").await;

        let result = stub
            .service()
            .list_time_off_requests("U1", None, None)
            .await
            .unwrap();

        assert!(result.call_successful);
        assert_eq!(result.request_count, 0);
    }

    #[tokio::test]
    async fn delete_echoes_external_code() {
        let stub = spawn_platform_stub(StatusCode::NO_CONTENT, "").await;

        let result = stub
            .service()
            .delete_time_off_request("REQ_0123456789a")
            .await
            .unwrap();

        assert!(result.call_successful);
        assert_eq!(result.status_code, 204);
        assert_eq!(result.external_code, "REQ_0123456789a");

        let requests = stub.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/odata/v2/EmployeeTime('REQ_0123456789a')");
        assert_eq!(requests[0].api_key.as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn unreachable_platform_is_a_transport_error() {
        let service = unreachable_service().await;

        let result = service.delete_time_off_request("REQ_X").await;

        assert!(matches!(
            result,
            Err(TimeOffError::Transport { operation: "delete", .. })
        ));
    }
}
