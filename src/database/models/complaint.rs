use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::blotter::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "complaint_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    UnderReview,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    pub id: Uuid,
    pub account_id: Uuid,
    pub reference_number: String,
    pub category: String,
    pub fullname: String,
    pub contact_number: String,
    pub address: String,
    pub email_address: String,
    pub subject: String,
    pub detailed_description: String,
    pub respondent_name: String,
    pub respondent_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ComplaintStatus,
    pub priority: Priority,
    pub date_filed: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ComplaintEvidence {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}
