use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_admin: bool,
}

/// Token plus user record, as returned by `/login` and `/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserInfo,
}

/// Vitals for the risk prediction model. Field names follow the model's
/// training columns, hence the capitalized wire names.
#[derive(Debug, Clone, Serialize)]
pub struct RiskInput {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "SystolicBP")]
    pub systolic_bp: f64,
    #[serde(rename = "DiastolicBP")]
    pub diastolic_bp: f64,
    #[serde(rename = "BS")]
    pub blood_sugar: f64,
    #[serde(rename = "BodyTemp")]
    pub body_temp: f64,
    #[serde(rename = "HeartRate")]
    pub heart_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    pub probability: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    pub score: u32,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestScoreEntry {
    pub id: i64,
    pub score: u32,
    pub max_score: u32,
    pub test_date: chrono::NaiveDateTime,
    #[serde(default)]
    pub topics: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreHistory {
    pub test_scores: Vec<TestScoreEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPeriod {
    Week,
    Month,
    Year,
}

impl StatsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsPeriod::Week => "week",
            StatsPeriod::Month => "month",
            StatsPeriod::Year => "year",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminStatsPayload {
    pub data: AdminStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub average_score: f64,
    pub total_tests: u64,
    pub time_period: String,
    pub topic_performance: BTreeMap<String, f64>,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecentActivity {
    pub user_name: String,
    pub score: u32,
    pub max_score: u32,
    pub date: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushTokenRegistration {
    pub push_token: String,
    pub platform: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatQuery {
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
