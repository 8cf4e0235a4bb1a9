//! Inbound event model and its Stream Load wire form.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// `event_time` layout expected by the target table's DATETIME column.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Body of `POST /video`.
///
/// Absent fields deserialize as empty strings so that a missing `project`
/// and an empty one are rejected the same way by [`EventRequest::missing_field`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EventRequest {
    pub project: String,
    pub event: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
}

impl EventRequest {
    /// Name of the first required field that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.project.is_empty() {
            Some("project")
        } else if self.event.is_empty() {
            Some("event")
        } else {
            None
        }
    }
}

/// One row as sent to Doris.
///
/// Field order matches [`crate::stream_load::LOAD_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoadRecord {
    pub project: String,
    pub event: String,
    pub user_agent: String,
    pub event_time: String,
}

impl LoadRecord {
    /// Build the row for `request`, stamped with `received_at`.
    pub fn from_request(request: EventRequest, received_at: NaiveDateTime) -> Self {
        Self {
            project: request.project,
            event: request.event,
            user_agent: request.user_agent,
            event_time: received_at.format(EVENT_TIME_FORMAT).to_string(),
        }
    }

    /// Serialize as a single newline-terminated JSON line.
    pub fn to_json_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap()
    }

    #[test]
    fn user_agent_is_renamed() {
        let request: EventRequest =
            serde_json::from_str(r#"{"project":"app1","event":"play","userAgent":"UA/1.0"}"#).unwrap();
        let record = LoadRecord::from_request(request, at());

        assert_eq!(record.user_agent, "UA/1.0");
        assert_eq!(record.event_time, "2025-03-07 09:05:01");

        let line = String::from_utf8(record.to_json_line().unwrap()).unwrap();
        assert_eq!(
            line,
            "{\"project\":\"app1\",\"event\":\"play\",\"user_agent\":\"UA/1.0\",\"event_time\":\"2025-03-07 09:05:01\"}\n"
        );
    }

    #[test]
    fn absent_user_agent_is_empty() {
        let request: EventRequest = serde_json::from_str(r#"{"project":"app1","event":"play"}"#).unwrap();
        assert_eq!(request.missing_field(), None);
        let record = LoadRecord::from_request(request, at());
        assert_eq!(record.user_agent, "");
    }

    #[test]
    fn required_fields() {
        let missing: EventRequest = serde_json::from_str(r#"{"event":"play"}"#).unwrap();
        assert_eq!(missing.missing_field(), Some("project"));

        let empty: EventRequest = serde_json::from_str(r#"{"project":"app1","event":""}"#).unwrap();
        assert_eq!(empty.missing_field(), Some("event"));
    }

    #[test]
    fn json_line_parses_back() {
        let record = LoadRecord::from_request(
            EventRequest {
                project: "app \"quoted\"".to_string(),
                event: "seek\nnewline".to_string(),
                user_agent: "Mozilla/5.0 (X11; Linux)".to_string(),
            },
            at(),
        );
        let line = record.to_json_line().unwrap();
        assert_eq!(line.iter().filter(|b| **b == b'\n').count(), 1);

        let parsed: LoadRecord = serde_json::from_slice(&line).unwrap();
        assert_eq!(parsed, record);
        assert!(NaiveDateTime::parse_from_str(&parsed.event_time, EVENT_TIME_FORMAT).is_ok());
    }
}
