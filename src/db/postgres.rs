use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use crate::db::{Store, StoreError};
use crate::models::department::{Department, DepartmentDraft};
use crate::models::medicine::{Medicine, MedicineDetail, MedicineDraft};

const DEPARTMENT_COLUMNS: &str = "id, name, updated_by, updated_at";

const MEDICINE_COLUMNS: &str =
    "id, department_id, name, description, quantity, image_url, updated_by, updated_at";

const MEDICINE_DETAIL_SELECT: &str = r#"
    SELECT
        m.id, m.department_id, m.name, m.description, m.quantity,
        m.image_url, m.updated_by, m.updated_at,
        d.name AS department_name,
        d.updated_by AS department_updated_by,
        d.updated_at AS department_updated_at
    FROM medicines m
    JOIN departments d ON d.id = m.department_id
"#;

/// One row of the medicine/department join.
#[derive(sqlx::FromRow)]
struct MedicineDetailRow {
    id: i32,
    department_id: i32,
    name: String,
    description: Option<String>,
    quantity: i32,
    image_url: Option<String>,
    updated_by: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    department_name: String,
    department_updated_by: Option<String>,
    department_updated_at: Option<DateTime<Utc>>,
}

impl From<MedicineDetailRow> for MedicineDetail {
    fn from(row: MedicineDetailRow) -> Self {
        MedicineDetail {
            department: Department {
                id: row.department_id,
                name: row.department_name,
                updated_by: row.department_updated_by,
                updated_at: row.department_updated_at,
            },
            medicine: Medicine {
                id: row.id,
                department_id: row.department_id,
                name: row.name,
                description: row.description,
                quantity: row.quantity,
                image_url: row.image_url,
                updated_by: row.updated_by,
                updated_at: row.updated_at,
            },
        }
    }
}

/// PostgreSQL-backed store. Every operation checks a connection out of the
/// pool for its own duration and returns it on completion.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

async fn fetch_department(conn: &mut PgConnection, id: i32) -> Result<Option<Department>, sqlx::Error> {
    sqlx::query_as::<_, Department>(&format!(
        "SELECT {} FROM departments WHERE id = $1",
        DEPARTMENT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Loads the department a freshly written medicine points at. The row can only
/// be missing if the department was deleted between the two statements.
async fn attach_department(conn: &mut PgConnection, medicine: Medicine) -> Result<MedicineDetail, StoreError> {
    let department = fetch_department(conn, medicine.department_id)
        .await?
        .ok_or(StoreError::ConcurrencyConflict { entity: "Medicine", id: medicine.id })?;
    Ok(MedicineDetail { medicine, department })
}

#[async_trait]
impl Store for PgStore {
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let departments = sqlx::query_as::<_, Department>(&format!(
            "SELECT {} FROM departments ORDER BY id",
            DEPARTMENT_COLUMNS
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(departments)
    }

    async fn find_department(&self, id: i32) -> Result<Option<Department>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(fetch_department(&mut conn, id).await?)
    }

    async fn insert_department(&self, draft: DepartmentDraft) -> Result<Department, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let department = sqlx::query_as::<_, Department>(&format!(
            "INSERT INTO departments (name, updated_by, updated_at) VALUES ($1, $2, $3) RETURNING {}",
            DEPARTMENT_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.updated_by)
        .bind(draft.updated_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(department)
    }

    async fn update_department(&self, id: i32, draft: DepartmentDraft) -> Result<Department, StoreError> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query_as::<_, Department>(&format!(
            "UPDATE departments SET name = $1, updated_by = $2, updated_at = $3 WHERE id = $4 RETURNING {}",
            DEPARTMENT_COLUMNS
        ))
        .bind(&draft.name)
        .bind(&draft.updated_by)
        .bind(draft.updated_at)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::NotFound { entity: "Department", id })
    }

    async fn delete_department(&self, id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "Department", id });
        }
        Ok(())
    }

    async fn list_medicines(&self) -> Result<Vec<MedicineDetail>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, MedicineDetailRow>(&format!("{} ORDER BY m.id", MEDICINE_DETAIL_SELECT))
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(MedicineDetail::from).collect())
    }

    async fn find_medicine(&self, id: i32) -> Result<Option<MedicineDetail>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, MedicineDetailRow>(&format!("{} WHERE m.id = $1", MEDICINE_DETAIL_SELECT))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(MedicineDetail::from))
    }

    async fn list_medicines_by_department(&self, department_id: i32) -> Result<Vec<MedicineDetail>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, MedicineDetailRow>(&format!(
            "{} WHERE m.department_id = $1 ORDER BY m.id",
            MEDICINE_DETAIL_SELECT
        ))
        .bind(department_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(MedicineDetail::from).collect())
    }

    async fn insert_medicine(&self, draft: MedicineDraft) -> Result<MedicineDetail, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            r#"
            INSERT INTO medicines (department_id, name, description, quantity, image_url, updated_by, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MEDICINE_COLUMNS
        ))
        .bind(draft.department_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.quantity)
        .bind(&draft.image_url)
        .bind(&draft.updated_by)
        .bind(draft.updated_at)
        .fetch_one(&mut *conn)
        .await?;

        attach_department(&mut conn, medicine).await
    }

    async fn update_medicine(&self, id: i32, draft: MedicineDraft) -> Result<MedicineDetail, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let medicine = sqlx::query_as::<_, Medicine>(&format!(
            r#"
            UPDATE medicines
            SET department_id = $1, name = $2, description = $3, quantity = $4,
                image_url = $5, updated_by = $6, updated_at = $7
            WHERE id = $8
            RETURNING {}
            "#,
            MEDICINE_COLUMNS
        ))
        .bind(draft.department_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.quantity)
        .bind(&draft.image_url)
        .bind(&draft.updated_by)
        .bind(draft.updated_at)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::NotFound { entity: "Medicine", id })?;

        attach_department(&mut conn, medicine).await
    }

    async fn delete_medicine(&self, id: i32) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query("DELETE FROM medicines WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { entity: "Medicine", id });
        }
        Ok(())
    }
}
