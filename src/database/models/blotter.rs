use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "blotter_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BlotterStatus {
    Pending,
    UnderInvestigation,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "priority_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlotterReport {
    pub id: Uuid,
    pub filed_by: Uuid,
    pub complainant_name: String,
    pub respondent_name: String,
    pub incident_type: String,
    pub incident_date: NaiveDate,
    pub incident_time: String,
    pub location: String,
    pub description: String,
    pub status: BlotterStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
