use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::certificate::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BusinessPermit {
    pub id: Uuid,
    pub account_id: Uuid,
    pub business_name: String,
    pub business_type: String,
    pub owner_name: String,
    pub business_address: String,
    pub contact_number: String,
    pub owner_address: String,
    pub business_description: String,
    pub is_renewal: bool,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
