//! Wire types for the Freelance Manager REST API.
//!
//! DESIGN
//! ======
//! The session core treats the user record as an opaque payload it stores
//! and replaces wholesale. The known fields are typed for convenience; any
//! field the server adds lands in `extra` so a round trip through the client
//! never drops data.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// USER / AUTH
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// URL or server-relative path; `None` when no image was uploaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `POST /auth/login` and `POST /auth/register` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `PUT /auth/user` success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub specialization: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

/// Partial profile payload; unset fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// `GET /portfolio/{username}` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub username: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
    pub specialization: Option<String>,
    pub email: Option<String>,
    pub is_public: Option<bool>,
    pub projects: Vec<PortfolioProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioProject {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_hours: f64,
    pub total_billed: f64,
    pub category: Option<String>,
    pub is_public: Option<bool>,
}

/// `GET /projects/stats` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub recent_projects: Vec<Value>,
    pub public_projects_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyHours {
    pub date: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectHours {
    pub project_id: Option<i64>,
    pub project_title: String,
    pub hours: f64,
}

/// `GET /time/summary` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSummary {
    pub total_hours: f64,
    pub billable_hours: f64,
    pub billable_percentage: f64,
    pub hours_by_project: Vec<ProjectHours>,
    pub hours_by_day: Vec<DailyHours>,
}

/// `GET /invoices/stats` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceStats {
    pub total_invoiced: f64,
    pub total_paid: f64,
    pub pending_payment: f64,
    pub by_status: BTreeMap<String, u64>,
    pub overdue_count: u64,
}

/// Aggregated numbers shown on a portfolio page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub projects: ProjectStats,
    pub time: TimeSummary,
    pub invoices: InvoiceStats,
    /// Number of entries `GET /clients/` returned; 0 when the payload is not an array.
    pub clients: usize,
}
