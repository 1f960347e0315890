//! # JSON-Lines IPC
//!
//! The UI process talks to the host over stdin/stdout, one JSON document per
//! line in each direction.
//!
//! ## Wire Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request  (UI ──► host)                                                 │
//! │    {"id": 3, "command": "record_payment",                               │
//! │     "args": {"billId": 12, "amount": 5000, "paymentMode": "Cash"}}      │
//! │                                                                         │
//! │  success  (host ──► UI)                                                 │
//! │    {"id": 3, "ok": true, "data": {...}}                                 │
//! │                                                                         │
//! │  failure  (host ──► UI)                                                 │
//! │    {"id": 3, "ok": false,                                               │
//! │     "error": {"code": "PAYMENT_ERROR", "message": "..."}}               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Requests are handled one at a time in arrival order. A line that is not a
//! valid request gets a failure with `"id": null` and the loop carries on.
//! End of input ends the loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::commands;
use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

#[derive(Debug, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<u64>,
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    fn success(id: Option<u64>, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(id: Option<u64>, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Handles one request line and builds its response.
pub async fn handle_line(line: &str, db: &DbState, config: &ConfigState) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed request line");
            return Response::failure(None, ApiError::validation(format!("malformed request: {}", e)));
        }
    };

    let start = Instant::now();
    let result = commands::dispatch(db, config, &request.command, request.args).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(data) => {
            debug!(id = ?request.id, command = %request.command, elapsed_ms, "Command ok");
            Response::success(request.id, data)
        }
        Err(error) => {
            warn!(
                id = ?request.id,
                command = %request.command,
                code = ?error.code,
                message = %error.message,
                elapsed_ms,
                "Command failed"
            );
            Response::failure(request.id, error)
        }
    }
}

/// Serves requests from `reader` until end of input.
pub async fn serve<R, W>(reader: R, mut writer: W, db: &DbState, config: &ConfigState) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(line, db, config).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');

        writer.write_all(&encoded).await?;
        writer.flush().await?;
        handled += 1;
    }

    info!(handled, "Input closed");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lubri_db::{Database, DbConfig};

    async fn setup() -> (DbState, ConfigState) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        (DbState::new(db), ConfigState::default())
    }

    async fn run(input: &str) -> Vec<Value> {
        let (db, config) = setup().await;
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, &db, &config).await.unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_bill_round_trip_over_lines() {
        let input = [
            r#"{"id":1,"command":"add_product","args":{"name":"Engine Oil 20W-40 1L","quantity":10,"price":45000,"unitCost":38000}}"#,
            r#"{"id":2,"command":"create_bill","args":{"sellerName":"Owner","customer":{"name":"Ravi","phone":"9876543210"},"items":[{"productId":1,"quantity":2,"unitPrice":45000}],"payment":{"mode":"Cash","status":"Partial","amountPaid":50000}}}"#,
            r#"{"id":3,"command":"get_bill","args":{"billId":1}}"#,
            r#"{"id":4,"command":"get_product","args":{"id":1}}"#,
        ]
        .join("\n");

        let responses = run(&input).await;
        assert_eq!(responses.len(), 4);
        assert!(responses.iter().all(|r| r["ok"] == true), "{:?}", responses);

        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["data"]["bill_id"], 1);
        assert_eq!(responses[1]["data"]["totals"]["total"], 90000);

        assert_eq!(responses[2]["data"]["balance_due"], 40000);
        assert_eq!(responses[2]["data"]["customer_name"], "Ravi");
        assert_eq!(responses[3]["data"]["quantity"], 8);
    }

    #[tokio::test]
    async fn test_malformed_line_keeps_serving() {
        let input = "not json\n\n{\"id\":9,\"command\":\"list_categories\"}\n";

        let responses = run(input).await;
        assert_eq!(responses.len(), 2);

        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "VALIDATION_ERROR");

        assert_eq!(responses[1]["id"], 9);
        assert_eq!(responses[1]["ok"], true);
    }

    #[tokio::test]
    async fn test_command_errors() {
        let input = [
            r#"{"id":1,"command":"open_drawer"}"#,
            r#"{"id":2,"command":"get_bill","args":{"billId":404}}"#,
            r#"{"id":3,"command":"record_payment","args":{"billId":"x"}}"#,
        ]
        .join("\n");

        let responses = run(&input).await;
        assert_eq!(responses[0]["error"]["code"], "UNKNOWN_COMMAND");
        assert_eq!(responses[1]["error"]["code"], "NOT_FOUND");
        assert_eq!(responses[2]["error"]["code"], "VALIDATION_ERROR");
        assert!(responses.iter().all(|r| r.get("data").is_none()));
    }

    #[tokio::test]
    async fn test_health_check() {
        let responses = run(r#"{"id":1,"command":"health_check"}"#).await;
        let data = &responses[0]["data"];
        assert_eq!(data["database"], true);
        assert_eq!(data["migrations"]["applied"], data["migrations"]["total"]);
    }
}
