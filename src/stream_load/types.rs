//! Stream Load response contract and error definitions.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of `Status` for a committed load.
pub const STATUS_SUCCESS: &str = "Success";

/// Column list sent with every load, in `LoadRecord` field order.
pub const LOAD_COLUMNS: &str = "project,event,user_agent,event_time";

/// Longest body excerpt kept on errors.
const BODY_EXCERPT_BYTES: usize = 512;

/// Acknowledgment returned by a Doris BE for one Stream Load call.
///
/// Missing fields take their defaults and unknown fields are ignored; only a
/// body that is not a JSON object of this shape fails to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct LoadResult {
    pub txn_id: i64,
    pub label: String,
    pub status: String,
    pub message: String,
    pub number_total_rows: i64,
    pub number_loaded_rows: i64,
    pub number_filtered_rows: i64,
    pub number_unselected_rows: i64,
    pub load_bytes: i64,
    pub load_time_ms: i64,
    pub begin_txn_time_ms: i64,
    pub stream_load_put_time_ms: i64,
    pub read_data_time_ms: i64,
    pub write_data_time_ms: i64,
    pub commit_and_publish_time_ms: i64,
    #[serde(rename = "ErrorURL", skip_serializing_if = "Option::is_none")]
    pub error_url: Option<String>,
}

impl LoadResult {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// What went wrong at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// DNS resolution or TCP/TLS connect failed.
    Connect,
    /// The end-to-end deadline elapsed.
    Timeout,
    /// More redirects than the configured bound.
    RedirectLimit,
    /// Anything else (broken body stream, protocol violation, ...).
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportKind::Connect => "connection failed",
            TransportKind::Timeout => "timed out",
            TransportKind::RedirectLimit => "too many redirects",
            TransportKind::Other => "request failed",
        };
        f.write_str(s)
    }
}

/// Coarse classification of a failed load, stable across equal inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    Transport,
    Gateway,
    Protocol,
    Rejected,
}

impl LoadErrorKind {
    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadErrorKind::Transport => "transport",
            LoadErrorKind::Gateway => "gateway",
            LoadErrorKind::Protocol => "protocol",
            LoadErrorKind::Rejected => "rejected",
        }
    }
}

/// Errors from one Stream Load submission.
///
/// The `Display` form is meant for logs and may contain response bodies; use
/// [`LoadError::public_message`] for anything returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The call never produced a complete HTTP response.
    #[error("doris connection failed ({kind}): {detail}")]
    Transport { kind: TransportKind, detail: String },

    /// The BE answered with a non-200 status.
    #[error("doris returned HTTP {status}: {body}")]
    Gateway { status: u16, body: String },

    /// The BE answered 200 with a body that is not a load acknowledgment.
    #[error("unparseable doris response ({reason}): {body}")]
    Protocol { reason: String, body: String },

    /// The BE parsed the load but did not commit it.
    #[error("doris stream load failed: Status={status}, Message={message}, ErrorURL={}", .error_url.as_deref().unwrap_or(""))]
    Rejected {
        status: String,
        message: String,
        error_url: Option<String>,
    },
}

impl LoadError {
    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::Transport { .. } => LoadErrorKind::Transport,
            LoadError::Gateway { .. } => LoadErrorKind::Gateway,
            LoadError::Protocol { .. } => LoadErrorKind::Protocol,
            LoadError::Rejected { .. } => LoadErrorKind::Rejected,
        }
    }

    /// Short cause safe to return to the caller: no credentials, no raw
    /// response bodies, no BE-internal URLs.
    pub fn public_message(&self) -> String {
        match self {
            LoadError::Transport { kind, .. } => format!("transport error: {}", kind),
            LoadError::Gateway { status, .. } => format!("doris returned HTTP {}", status),
            LoadError::Protocol { .. } => "doris returned an unparseable response".to_string(),
            LoadError::Rejected { status, message, .. } => {
                format!("Status={}, Message={}", status, message)
            }
        }
    }
}

/// Classify a complete Stream Load response.
///
/// A load succeeds only when the HTTP status is 200 *and* the body's
/// `Status` is `"Success"`.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<LoadResult, LoadError> {
    if status != StatusCode::OK {
        return Err(LoadError::Gateway {
            status: status.as_u16(),
            body: excerpt(body),
        });
    }

    let result: LoadResult = serde_json::from_slice(body).map_err(|e| LoadError::Protocol {
        reason: e.to_string(),
        body: excerpt(body),
    })?;

    if !result.is_success() {
        return Err(LoadError::Rejected {
            status: result.status,
            message: result.message,
            error_url: result.error_url.filter(|u| !u.is_empty()),
        });
    }

    Ok(result)
}

/// Lossy UTF-8 prefix of `body`, cut on a character boundary.
pub fn excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_EXCERPT_BYTES {
        return text.into_owned();
    }
    let mut end = BODY_EXCERPT_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUCCESS_BODY: &str = r#"{
        "TxnId": 1003,
        "Label": "b6f3bc78-0d2c-45d9-9e4c-faa0a0149bee",
        "Status": "Success",
        "Message": "OK",
        "NumberTotalRows": 1,
        "NumberLoadedRows": 1,
        "NumberFilteredRows": 0,
        "NumberUnselectedRows": 0,
        "LoadBytes": 92,
        "LoadTimeMs": 21,
        "BeginTxnTimeMs": 1,
        "StreamLoadPutTimeMs": 2,
        "ReadDataTimeMs": 0,
        "WriteDataTimeMs": 11,
        "CommitAndPublishTimeMs": 5
    }"#;

    #[test]
    fn parses_success_acknowledgment() {
        let result = interpret_response(StatusCode::OK, SUCCESS_BODY.as_bytes()).unwrap();
        assert_eq!(result.txn_id, 1003);
        assert_eq!(result.label, "b6f3bc78-0d2c-45d9-9e4c-faa0a0149bee");
        assert_eq!(result.number_loaded_rows, 1);
        assert_eq!(result.load_time_ms, 21);
        assert_eq!(result.commit_and_publish_time_ms, 5);
        assert_eq!(result.error_url, None);
    }

    #[test]
    fn non_success_status_is_rejection() {
        let body = br#"{"Status":"Fail","Message":"too many filtered rows","ErrorURL":"http://be:8040/api/_load_error_log?file=x"}"#;
        let err = interpret_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(
            err,
            LoadError::Rejected {
                status: "Fail".to_string(),
                message: "too many filtered rows".to_string(),
                error_url: Some("http://be:8040/api/_load_error_log?file=x".to_string()),
            }
        );
        assert_eq!(err.public_message(), "Status=Fail, Message=too many filtered rows");
        assert!(!err.public_message().contains("_load_error_log"));
    }

    #[test]
    fn label_already_exists_is_rejection() {
        let body = br#"{"Status":"Label Already Exists","ExistingJobStatus":"FINISHED"}"#;
        let err = interpret_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Rejected);
    }

    #[test]
    fn non_200_is_gateway_error_even_with_success_body() {
        let err = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, SUCCESS_BODY.as_bytes())
            .unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Gateway);
        assert_eq!(err.public_message(), "doris returned HTTP 500");
    }

    #[test]
    fn garbage_body_is_protocol_error() {
        let err = interpret_response(StatusCode::OK, b"<html>proxy error</html>").unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Protocol);
        assert!(!err.public_message().contains("proxy error"));
        assert!(err.to_string().contains("proxy error"));
    }

    #[test]
    fn classification_is_stable_for_equal_input() {
        let body = b"{\"Status\": 42}";
        let first = interpret_response(StatusCode::OK, body).unwrap_err();
        let second = interpret_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(first.kind(), LoadErrorKind::Protocol);
        assert_eq!(first, second);
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let cut = excerpt(body.as_bytes());
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= BODY_EXCERPT_BYTES + 3);
        assert_eq!(excerpt(b"short"), "short");
    }
}
