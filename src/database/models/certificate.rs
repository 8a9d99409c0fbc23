use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shared by certificate requests and business permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CertificateRequest {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub certificate_type: String,
    pub request_number: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub complete_address: String,
    pub contact_number: String,
    pub email_address: String,
    pub purpose: String,
    pub agree_terms: bool,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}
