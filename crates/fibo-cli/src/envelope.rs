//! JSON response envelope.
//!
//! Every command in `--json` mode prints one `Response`:
//!
//! ```json
//! {"status":"OK","message":"","value":"55"}
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// Result of one command as seen by a machine consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,
    pub message: String,
    /// Decimal text of the result; empty when there is none.
    pub value: String,
}

impl Response {
    /// A successful response carrying `value`.
    pub fn ok(message: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: message.into(),
            value: value.into(),
        }
    }

    /// A failed response; `value` is left empty.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            value: String::new(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_layout() {
        let json = Response::ok("", "55").to_json().unwrap();
        assert_eq!(json, r#"{"status":"OK","message":"","value":"55"}"#);
    }

    #[test]
    fn error_layout() {
        let json = Response::error("invalid ordinal: \"x\"").to_json().unwrap();
        assert_eq!(
            json,
            r#"{"status":"ERROR","message":"invalid ordinal: \"x\"","value":""}"#
        );
    }

    #[test]
    fn decodes_external_envelope() {
        let response: Response =
            serde_json::from_str(r#"{"status":"OK","message":"Cache cleared","value":""}"#)
                .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.message, "Cache cleared");
    }

    #[test]
    fn rejects_unknown_status() {
        let result =
            serde_json::from_str::<Response>(r#"{"status":"MAYBE","message":"","value":""}"#);
        assert!(result.is_err());
    }
}
