use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};
use crate::utils::validation::not_blank;

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for create and full-replace update. `updatedAt` is never read
/// from the client; unknown fields are ignored.
#[derive(Deserialize, Validate, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    pub id: Option<i32>,
    #[validate(required, length(max = 100), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub updated_by: Option<String>,
}

/// Accepted column values for an insert or a full replace.
#[derive(Debug)]
pub struct DepartmentDraft {
    pub name: String,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}
