// Axum handlers for MCP server
use axum::extract::State;
use axum::{body::Body, http::{header, StatusCode}, response::Response, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::rpc::{
    ErrorObject, InitializeParams, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcRequestWithParams, JsonRpcRequestWithoutParams, JsonRpcResponse, ToolCallParams,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::service::{TimeOffError, TimeOffService};
use crate::tools::{
    get_tools_description_json, BookTimeOffArgs, DeleteTimeOffArgs, ListTimeOffArgs, BOOK_TIME_OFF,
    DELETE_TIME_OFF_REQUEST, LIST_TIME_OFF_REQUESTS,
};
use crate::view::McpView;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "successfactors-timeoff-mcp";

pub struct AppState {
    pub service: TimeOffService,
}

pub async fn mcp_handler(State(state): State<Arc<AppState>>, Json(request_value): Json<Value>) -> Response {
    let id = request_value.get("id").cloned().unwrap_or(Value::Null);
    let request: Result<JsonRpcRequest, _> = serde_json::from_value(request_value);
    match request {
        Ok(JsonRpcRequest::WithParams(req)) => handle_request_with_params(&state, req).await,
        Ok(JsonRpcRequest::WithoutParams(req)) => handle_request_without_params(req),
        Ok(JsonRpcRequest::Notification(req)) => handle_notification(req),
        Err(_) => {
            let error = JsonRpcErrorResponse::new(id, PARSE_ERROR, "Parse error".to_string());
            create_jsonrpc_response(&error)
        }
    }
}

pub async fn handle_request_with_params(state: &AppState, req: JsonRpcRequestWithParams) -> Response {
    match req.method.as_str() {
        "initialize" => process_init(&req),
        "tools/list" => tools_list_response(req.id),
        "ping" => create_jsonrpc_response(&JsonRpcResponse::new(req.id, json!({}))),
        "tools/call" => {
            let params: Result<ToolCallParams, _> = serde_json::from_value(req.params);
            let outcome = match params {
                Ok(tool_params) => call_tool(&state.service, tool_params).await,
                Err(_) => Err(ErrorObject::new(INVALID_PARAMS, "Invalid params for tools/call")),
            };
            match outcome {
                Ok(result) => create_jsonrpc_response(&JsonRpcResponse::new(req.id, result)),
                Err(error) => create_jsonrpc_response(&JsonRpcErrorResponse::from_error(req.id, error)),
            }
        }
        _ => {
            let error = JsonRpcErrorResponse::new(req.id, METHOD_NOT_FOUND, "Method not found".to_string());
            create_jsonrpc_response(&error)
        }
    }
}

// Platform failures come back as `isError: true` results; only unknown tools and bad arguments are JSON-RPC errors
pub async fn call_tool(service: &TimeOffService, params: ToolCallParams) -> Result<Value, ErrorObject> {
    info!("Calling tool {}", params.name);
    let invalid = |e: crate::tools::ArgumentError| {
        warn!("{}", e);
        ErrorObject::new(INVALID_PARAMS, e.to_string())
    };

    let result = match params.name.as_str() {
        BOOK_TIME_OFF => {
            let args = BookTimeOffArgs::parse(params.arguments).map_err(invalid)?;
            service
                .book_time_off(&args.user_id, args.start_date, args.end_date)
                .await
                .map(|r| tool_result(&r, r.call_successful))
        }
        LIST_TIME_OFF_REQUESTS => {
            let args = ListTimeOffArgs::parse(params.arguments).map_err(invalid)?;
            service
                .list_time_off_requests(&args.user_id, args.start_date_filter, args.end_date_filter)
                .await
                .map(|r| tool_result(&r, r.call_successful))
        }
        DELETE_TIME_OFF_REQUEST => {
            let args = DeleteTimeOffArgs::parse(params.arguments).map_err(invalid)?;
            service
                .delete_time_off_request(&args.external_code)
                .await
                .map(|r| tool_result(&r, r.call_successful))
        }
        _ => return Err(ErrorObject::new(METHOD_NOT_FOUND, "Method not found")),
    };

    Ok(result.unwrap_or_else(|e| transport_failure_result(&e)))
}

fn tool_result<T: Serialize + McpView>(result: &T, call_successful: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": result.to_mcp_view()
            }
        ],
        "structuredContent": serde_json::to_value(result).unwrap_or(Value::Null),
        "isError": !call_successful
    })
}

fn transport_failure_result(error: &TimeOffError) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": error.to_string()
            }
        ],
        "isError": true
    })
}

fn tools_list_response(id: Value) -> Response {
    let response = JsonRpcResponse::new(id, json!({ "tools": get_tools_description_json() }));
    create_jsonrpc_response(&response)
}

pub fn process_init(req: &JsonRpcRequestWithParams) -> Response {
    let params: Result<InitializeParams, _> = serde_json::from_value(req.params.clone());
    match params {
        Ok(params) => {
            debug!("Initialize from client {} ({})", params.client_info, params.protocol_version);
            let response = JsonRpcResponse::new(
                req.id.clone(),
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {
                        "tools": {
                            "listChanged": false
                        }
                    },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            );
            create_jsonrpc_response(&response)
        }
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                req.id.clone(),
                INVALID_PARAMS,
                format!("Invalid params for initialize: {e}"),
            );
            create_jsonrpc_response(&error)
        }
    }
}

pub fn handle_request_without_params(req: JsonRpcRequestWithoutParams) -> Response {
    match req.method.as_str() {
        "tools/list" => tools_list_response(req.id),
        "ping" => create_jsonrpc_response(&JsonRpcResponse::new(req.id, json!({}))),
        "tools/call" | "initialize" => {
            let error = JsonRpcErrorResponse::new(
                req.id,
                INVALID_PARAMS,
                format!("Invalid params for {}: missing params", req.method),
            );
            create_jsonrpc_response(&error)
        }
        _ => {
            let error = JsonRpcErrorResponse::new(req.id, METHOD_NOT_FOUND, "Method not found".to_string());
            create_jsonrpc_response(&error)
        }
    }
}

pub fn handle_notification(req: JsonRpcNotification) -> Response {
    debug!("Notification {}", req.method);
    json_response(StatusCode::OK, "{}".to_string())
}

pub fn create_jsonrpc_response<T: Serialize>(payload: &T) -> Response {
    match serde_json::to_string(payload) {
        Ok(json_string) => json_response(StatusCode::OK, json_string),
        Err(_) => json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"failed to serialize response"}"#.to_string(),
        ),
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
    response
}
