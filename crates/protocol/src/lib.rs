//! Gateway RPC protocol definitions.
//!
//! All communication uses JSON frames:
//! - `RequestFrame`: client-to-gateway RPC call
//! - `ResponseFrame`: gateway-to-client RPC result
//!
//! Wire field names are camelCase.

use serde::{Deserialize, Serialize};

// ── Error codes ──────────────────────────────────────────────────────────────

pub mod error_codes {
    /// The request is malformed or references something that does not exist.
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    /// The request is well-formed but cannot be served right now.
    pub const UNAVAILABLE: &str = "UNAVAILABLE";
}

// ── Error shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorShape {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(error_codes::INVALID_REQUEST, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::UNAVAILABLE, message)
    }
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Client → gateway RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFrame {
    pub r#type: String, // always "req"
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl RequestFrame {
    pub fn new(id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            r#type: "req".into(),
            id: id.into(),
            method: method.into(),
            params: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// Gateway → client RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub r#type: String, // always "res"
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResponseFrame {
    pub fn ok(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            r#type: "res".into(),
            id: id.into(),
            ok: true,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn err(id: impl Into<String>, error: ErrorShape) -> Self {
        Self {
            r#type: "res".into(),
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(error),
        }
    }
}

// ── Wizard method params ─────────────────────────────────────────────────────

/// Parameters for `wizard.start`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardStartParams {
    /// `"onboard"` (default) or `"configure"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Workspace directory override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Section names to configure; implies configure mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<String>>,
}

/// An answer to the current step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WizardAnswer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Parameters for `wizard.next`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardNextParams {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<WizardAnswer>,
    /// `"next"`, `"back"`, or `"cancel"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav: Option<String>,
}

/// Parameters for `wizard.cancel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardCancelParams {
    pub session_id: String,
}

/// Parameters for `wizard.status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStatusParams {
    pub session_id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn response_frames_carry_either_payload_or_error() {
        let ok = ResponseFrame::ok("1", json!({"done": false}));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["type"], json!("res"));
        assert_eq!(value["ok"], json!(true));
        assert!(value.get("error").is_none());

        let err = ResponseFrame::err("2", ErrorShape::unavailable("busy"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"]["code"], json!("UNAVAILABLE"));
        assert!(value.get("payload").is_none());
    }

    #[test]
    fn next_params_use_camel_case() {
        let params: WizardNextParams = serde_json::from_value(json!({
            "sessionId": "abc",
            "answer": { "stepId": "name", "value": "Ada" },
            "nav": "next",
        }))
        .unwrap();
        assert_eq!(params.session_id, "abc");
        let answer = params.answer.unwrap();
        assert_eq!(answer.step_id.as_deref(), Some("name"));
        assert_eq!(answer.value, Some(json!("Ada")));
    }

    #[test]
    fn start_params_default_to_empty() {
        let params: WizardStartParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.mode.is_none());
        assert!(params.sections.is_none());
    }
}
