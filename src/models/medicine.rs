use serde::{Deserialize, Serialize};
use validator::Validate;
use chrono::{DateTime, Utc};
use crate::models::department::Department;
use crate::utils::validation::not_blank;

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: i32,
    pub department_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A medicine together with the department it belongs to, as returned by every
/// medicine endpoint.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MedicineDetail {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub department: Department,
}

#[derive(Deserialize, Validate, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePayload {
    pub id: Option<i32>,
    #[validate(required)]
    pub department_id: Option<i32>,
    #[validate(required, length(max = 200), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(required, range(min = 0, message = "Quantity must be a positive number"))]
    pub quantity: Option<i32>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[validate(length(max = 50))]
    pub updated_by: Option<String>,
}

#[derive(Debug)]
pub struct MedicineDraft {
    pub department_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}
