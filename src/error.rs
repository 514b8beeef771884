use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One entry of a backend validation error array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationIssue {
    #[serde(default, deserialize_with = "loc_parts")]
    pub loc: Vec<String>,
    #[serde(default)]
    pub msg: String,
}

impl ValidationIssue {
    pub fn new(loc: &[&str], msg: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
        }
    }

    /// `msg [body.field]`, or just `msg` without a location.
    pub fn line(&self) -> String {
        if self.loc.is_empty() {
            self.msg.clone()
        } else {
            format!("{} [{}]", self.msg, self.loc.join("."))
        }
    }
}

fn loc_parts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let parts = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(parts
        .into_iter()
        .map(|part| match part {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect())
}

/// Join validation issues into one alert, one line per issue.
pub fn flatten_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ValidationIssue::line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status { status: u16, detail: Option<String> },
    #[error("validation failed: {}", flatten_issues(.0))]
    Validation(Vec<ValidationIssue>),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("cannot read {path}: {message}")]
    LocalFile { path: String, message: String },
}

impl ApiError {
    /// Classify a non-success response by its JSON `detail` field.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            #[serde(default)]
            detail: Option<Value>,
        }

        let detail = serde_json::from_str::<Envelope>(body)
            .ok()
            .and_then(|envelope| envelope.detail);

        match detail {
            Some(Value::Array(items)) => {
                let issues = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value::<ValidationIssue>(item).ok())
                    .collect::<Vec<_>>();
                if issues.is_empty() {
                    ApiError::Status {
                        status,
                        detail: None,
                    }
                } else {
                    ApiError::Validation(issues)
                }
            }
            Some(Value::String(text)) => ApiError::Status {
                status,
                detail: Some(text),
            },
            _ => ApiError::Status {
                status,
                detail: None,
            },
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == 401 || *status == 403)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Text for a blocking alert: validation lines, a server detail, a
    /// network prefix, or the caller's fallback.
    pub fn alert_text(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(issues) => flatten_issues(issues),
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Network(message) => format!("Помилка мережі: {message}"),
            ApiError::LocalFile { path, message } => format!("{fallback}: {path}: {message}"),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                detail: None,
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_array_flattens_one_line_per_issue() {
        let body = r#"{"detail": [
            {"loc": ["body", "email"], "msg": "value is not a valid email", "type": "value_error"},
            {"loc": ["body", "phone_numbers", 0, "number"], "msg": "too short"}
        ]}"#;
        let err = ApiError::from_body(422, body);
        assert_eq!(
            err.alert_text("Помилка збереження контакту"),
            "value is not a valid email [body.email]\ntoo short [body.phone_numbers.0.number]"
        );
    }

    #[test]
    fn test_string_detail_is_shown_verbatim() {
        let err = ApiError::from_body(400, r#"{"detail": "Contact already exists"}"#);
        assert_eq!(err.detail(), Some("Contact already exists"));
        assert_eq!(err.alert_text("fallback"), "Contact already exists");
    }

    #[test]
    fn test_unparseable_body_uses_fallback() {
        let err = ApiError::from_body(500, "<html>oops</html>");
        assert_eq!(
            err.alert_text("Помилка збереження контакту"),
            "Помилка збереження контакту"
        );
        let err = ApiError::from_body(500, r#"{"detail": []}"#);
        assert_eq!(err.alert_text("fb"), "fb");
    }

    #[test]
    fn test_auth_statuses() {
        assert!(ApiError::from_body(401, "").is_auth());
        assert!(ApiError::from_body(403, "").is_auth());
        assert!(!ApiError::from_body(404, "").is_auth());
        assert!(!ApiError::Network("refused".into()).is_auth());
    }

    #[test]
    fn test_network_alert_prefix() {
        let err = ApiError::Network("connection refused".into());
        assert!(err.is_network());
        assert_eq!(err.alert_text("x"), "Помилка мережі: connection refused");
    }
}
