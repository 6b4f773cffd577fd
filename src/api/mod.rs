pub mod types;

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use types::{
    AdminStats, AdminStatsPayload, AuthPayload, ChatQuery, ChatReply, Credentials, Prediction,
    PushTokenRegistration, Registration, RiskInput, ScoreHistory, ScoreSubmission, StatsPeriod,
    TestScoreEntry,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("not signed in")]
    MissingToken,
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

/// Thin client for the SymbiHelp backend. Cheap to clone; clones share the
/// underlying connection pool, so a background submission can take its own
/// copy without coordination.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            http,
            token: None,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("SYMBIHELP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        let body = Credentials {
            email: normalize_email(email),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("/login")).json(&body).send().await?;
        decode(response).await
    }

    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload, ApiError> {
        let body = Registration {
            full_name: full_name.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.url("/register"))
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn predict(&self, vitals: &RiskInput) -> Result<Prediction, ApiError> {
        let response = self
            .http
            .post(self.url("/predict"))
            .bearer_auth(self.bearer()?)
            .json(vitals)
            .send()
            .await?;
        decode(response).await
    }

    /// One submission attempt, no retries; the caller decides what a failure
    /// means (for the quiz it is a logged notice, never a blocker).
    pub async fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/test-scores"))
            .bearer_auth(self.bearer()?)
            .json(submission)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn test_scores(&self) -> Result<Vec<TestScoreEntry>, ApiError> {
        let response = self
            .http
            .get(self.url("/test-scores"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        let history: ScoreHistory = decode(response).await?;
        Ok(history.test_scores)
    }

    pub async fn admin_stats(&self, period: StatsPeriod) -> Result<AdminStats, ApiError> {
        let response = self
            .http
            .get(self.url("/admin/stats"))
            .query(&[("period", period.as_str())])
            .bearer_auth(self.bearer()?)
            .send()
            .await?;
        let payload: AdminStatsPayload = decode(response).await?;
        Ok(payload.data)
    }

    /// Asks the assistant a question. The endpoint itself is open; the
    /// token is attached when present so the server can personalize the
    /// reply with the latest known risk.
    pub async fn chat(&self, query: &str) -> Result<String, ApiError> {
        let body = ChatQuery {
            query: query.trim().to_string(),
        };
        let mut request = self.http.post(self.url("/chat")).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let reply: ChatReply = decode(request.send().await?).await?;
        Ok(reply.response)
    }

    pub async fn register_push_token(
        &self,
        push_token: &str,
        platform: &str,
    ) -> Result<(), ApiError> {
        let body = PushTokenRegistration {
            push_token: push_token.to_string(),
            platform: platform.to_string(),
        };
        let response = self
            .http
            .post(self.url("/notifications/register-token"))
            .bearer_auth(self.bearer()?)
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::MissingToken)
    }
}

/// The server matches emails case-insensitively; normalize before sending so
/// a stray capital or space does not create a "new" account.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let value: serde_json::Value = response.json().await?;
    let value = parse_envelope(status, value)?;
    Ok(serde_json::from_value(value)?)
}

async fn check(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    let value: serde_json::Value = response.json().await?;
    parse_envelope(status, value)?;
    Ok(())
}

/// Every endpoint wraps its payload in `{status, message, ...}`; anything but
/// a `success` status on a 2xx response maps to `Rejected` with the server's
/// message.
fn parse_envelope(
    status: StatusCode,
    value: serde_json::Value,
) -> Result<serde_json::Value, ApiError> {
    let ok = value.get("status").and_then(|v| v.as_str()) == Some("success");
    if status.is_success() && ok {
        return Ok(value);
    }
    let message = value
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("request rejected by server")
        .to_string();
    Err(ApiError::Rejected { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn success_envelope_passes_payload_through() {
        let value = json!({"status": "success", "token": "t", "user": {
            "id": 1, "email": "a@b.c", "full_name": "A", "role": "mother", "is_admin": false
        }});
        let value = parse_envelope(StatusCode::OK, value).unwrap();
        let payload: AuthPayload = serde_json::from_value(value).unwrap();
        assert_eq!(payload.token, "t");
        assert_eq!(payload.user.role, "mother");
    }

    #[test]
    fn error_envelope_carries_server_message() {
        let value = json!({"status": "error", "message": "Invalid password"});
        let err = parse_envelope(StatusCode::UNAUTHORIZED, value).unwrap_err();
        match err {
            ApiError::Rejected { status, message } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Invalid password");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn error_status_with_success_body_is_still_rejected() {
        let value = json!({"status": "success"});
        assert!(parse_envelope(StatusCode::INTERNAL_SERVER_ERROR, value).is_err());
    }

    #[test]
    fn score_submission_serializes_the_expected_payload() {
        let submission = ScoreSubmission {
            score: 15,
            total: 15,
            topics: None,
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value, json!({"score": 15, "total": 15}));
    }

    #[test]
    fn score_submission_includes_topics_when_present() {
        let mut topics = BTreeMap::new();
        topics.insert("Shiatsu".to_string(), 3);
        let submission = ScoreSubmission {
            score: 7,
            total: 15,
            topics: Some(topics),
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["topics"]["Shiatsu"], 3);
    }

    #[test]
    fn risk_input_uses_model_column_names() {
        let vitals = RiskInput {
            age: 29.0,
            systolic_bp: 120.0,
            diastolic_bp: 80.0,
            blood_sugar: 6.5,
            body_temp: 98.0,
            heart_rate: 72.0,
        };
        let value = serde_json::to_value(&vitals).unwrap();
        assert_eq!(value["Age"], 29.0);
        assert_eq!(value["SystolicBP"], 120.0);
        assert_eq!(value["BS"], 6.5);
    }

    #[test]
    fn chat_query_serializes_the_expected_payload() {
        let body = ChatQuery {
            query: "Is walking safe in early labor?".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({"query": "Is walking safe in early labor?"}));
    }

    #[test]
    fn chat_reply_parses_the_response_field() {
        let value = json!({"status": "success", "response": "Yes, gentle walking is encouraged."});
        let value = parse_envelope(StatusCode::OK, value).unwrap();
        let reply: ChatReply = serde_json::from_value(value).unwrap();
        assert_eq!(reply.response, "Yes, gentle walking is encouraged.");
    }

    #[test]
    fn email_is_normalized_for_the_server() {
        assert_eq!(normalize_email("  Mother@Example.COM "), "mother@example.com");
    }

    #[test]
    fn history_entry_parses_iso_dates() {
        let value = json!({
            "id": 3, "score": 13, "max_score": 15,
            "test_date": "2026-08-01T09:30:00.123456", "topics": null
        });
        let entry: TestScoreEntry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.score, 13);
        assert_eq!(entry.test_date.format("%Y-%m-%d").to_string(), "2026-08-01");
    }
}
