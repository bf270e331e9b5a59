pub mod postgres;
#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use crate::config::Config;
use crate::models::department::{Department, DepartmentDraft};
use crate::models::medicine::{MedicineDetail, MedicineDraft};

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    /// Foreign-key, uniqueness, check or not-null violation reported by the database.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("{entity} with ID {id} changed while the request was in flight")]
    ConcurrencyConflict { entity: &'static str, id: i32 },
    #[error(transparent)]
    Database(sqlx::Error),
}

impl StoreError {
    /// An update that follows a successful existence check and then finds no
    /// row has lost a race with a concurrent delete.
    pub fn vanished(self) -> Self {
        match self {
            StoreError::NotFound { entity, id } => StoreError::ConcurrencyConflict { entity, id },
            other => other,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::ForeignKeyViolation
                | ErrorKind::UniqueViolation
                | ErrorKind::CheckViolation
                | ErrorKind::NotNullViolation => {
                    return StoreError::ConstraintViolation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Typed access to the department and medicine tables. Handlers share one
/// implementation as `web::Data<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
    async fn find_department(&self, id: i32) -> Result<Option<Department>, StoreError>;
    async fn insert_department(&self, draft: DepartmentDraft) -> Result<Department, StoreError>;
    /// Full replace of every mutable column.
    async fn update_department(&self, id: i32, draft: DepartmentDraft) -> Result<Department, StoreError>;
    /// Removes the department and, through the foreign key, all of its medicines.
    async fn delete_department(&self, id: i32) -> Result<(), StoreError>;

    async fn list_medicines(&self) -> Result<Vec<MedicineDetail>, StoreError>;
    async fn find_medicine(&self, id: i32) -> Result<Option<MedicineDetail>, StoreError>;
    /// Empty when nothing matches, whether or not the department exists.
    async fn list_medicines_by_department(&self, department_id: i32) -> Result<Vec<MedicineDetail>, StoreError>;
    async fn insert_medicine(&self, draft: MedicineDraft) -> Result<MedicineDetail, StoreError>;
    async fn update_medicine(&self, id: i32, draft: MedicineDraft) -> Result<MedicineDetail, StoreError>;
    async fn delete_medicine(&self, id: i32) -> Result<(), StoreError>;
}

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
