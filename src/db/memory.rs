use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use crate::db::{Store, StoreError};
use crate::models::department::{Department, DepartmentDraft};
use crate::models::medicine::{Medicine, MedicineDetail, MedicineDraft};

/// In-process stand-in for the PostgreSQL schema used by handler tests. Ids are
/// assigned from 1, the department foreign key is enforced and deletes cascade.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    departments: BTreeMap<i32, Department>,
    medicines: BTreeMap<i32, Medicine>,
    last_department_id: i32,
    last_medicine_id: i32,
}

impl Tables {
    fn detail(&self, medicine: &Medicine) -> Option<MedicineDetail> {
        self.departments.get(&medicine.department_id).map(|department| MedicineDetail {
            medicine: medicine.clone(),
            department: department.clone(),
        })
    }

    fn check_department(&self, department_id: i32) -> Result<(), StoreError> {
        if !self.departments.contains_key(&department_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "medicines.department_id {} has no matching department",
                department_id
            )));
        }
        Ok(())
    }
}

fn department_from(draft: DepartmentDraft, id: i32) -> Department {
    Department {
        id,
        name: draft.name,
        updated_by: draft.updated_by,
        updated_at: Some(draft.updated_at),
    }
}

fn medicine_from(draft: MedicineDraft, id: i32) -> Medicine {
    Medicine {
        id,
        department_id: draft.department_id,
        name: draft.name,
        description: draft.description,
        quantity: draft.quantity,
        image_url: draft.image_url,
        updated_by: draft.updated_by,
        updated_at: Some(draft.updated_at),
    }
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        Ok(self.lock().departments.values().cloned().collect())
    }

    async fn find_department(&self, id: i32) -> Result<Option<Department>, StoreError> {
        Ok(self.lock().departments.get(&id).cloned())
    }

    async fn insert_department(&self, draft: DepartmentDraft) -> Result<Department, StoreError> {
        let mut tables = self.lock();
        tables.last_department_id += 1;
        let department = department_from(draft, tables.last_department_id);
        tables.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn update_department(&self, id: i32, draft: DepartmentDraft) -> Result<Department, StoreError> {
        let mut tables = self.lock();
        let slot = tables
            .departments
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "Department", id })?;
        *slot = department_from(draft, id);
        Ok(slot.clone())
    }

    async fn delete_department(&self, id: i32) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.departments.remove(&id).is_none() {
            return Err(StoreError::NotFound { entity: "Department", id });
        }
        tables.medicines.retain(|_, medicine| medicine.department_id != id);
        Ok(())
    }

    async fn list_medicines(&self) -> Result<Vec<MedicineDetail>, StoreError> {
        let tables = self.lock();
        Ok(tables.medicines.values().filter_map(|m| tables.detail(m)).collect())
    }

    async fn find_medicine(&self, id: i32) -> Result<Option<MedicineDetail>, StoreError> {
        let tables = self.lock();
        Ok(tables.medicines.get(&id).and_then(|m| tables.detail(m)))
    }

    async fn list_medicines_by_department(&self, department_id: i32) -> Result<Vec<MedicineDetail>, StoreError> {
        let tables = self.lock();
        Ok(tables
            .medicines
            .values()
            .filter(|m| m.department_id == department_id)
            .filter_map(|m| tables.detail(m))
            .collect())
    }

    async fn insert_medicine(&self, draft: MedicineDraft) -> Result<MedicineDetail, StoreError> {
        let mut tables = self.lock();
        tables.check_department(draft.department_id)?;
        tables.last_medicine_id += 1;
        let medicine = medicine_from(draft, tables.last_medicine_id);
        tables.medicines.insert(medicine.id, medicine.clone());
        tables
            .detail(&medicine)
            .ok_or(StoreError::ConcurrencyConflict { entity: "Medicine", id: medicine.id })
    }

    async fn update_medicine(&self, id: i32, draft: MedicineDraft) -> Result<MedicineDetail, StoreError> {
        let mut tables = self.lock();
        if !tables.medicines.contains_key(&id) {
            return Err(StoreError::NotFound { entity: "Medicine", id });
        }
        tables.check_department(draft.department_id)?;
        let medicine = medicine_from(draft, id);
        tables.medicines.insert(id, medicine.clone());
        tables
            .detail(&medicine)
            .ok_or(StoreError::ConcurrencyConflict { entity: "Medicine", id })
    }

    async fn delete_medicine(&self, id: i32) -> Result<(), StoreError> {
        match self.lock().medicines.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { entity: "Medicine", id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use chrono::Utc;
    use serde_json::Value;
    use crate::errors::AppError;

    fn department_draft(name: &str) -> DepartmentDraft {
        DepartmentDraft {
            name: name.to_string(),
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    fn medicine_draft(department_id: i32) -> MedicineDraft {
        MedicineDraft {
            department_id,
            name: "Aspirin".to_string(),
            description: None,
            quantity: 10,
            image_url: None,
            updated_by: None,
            updated_at: Utc::now(),
        }
    }

    async fn assert_internal_error(err: StoreError) {
        let err = AppError::from(err);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["error"],
            "An unexpected error occurred while processing the request."
        );
    }

    #[actix_web::test]
    async fn insert_with_dangling_department_is_a_constraint_violation() {
        let store = MemoryStore::default();

        let err = store.insert_medicine(medicine_draft(9)).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert!(store.list_medicines().await.unwrap().is_empty());

        assert_internal_error(err).await;
    }

    #[actix_web::test]
    async fn update_with_dangling_department_is_a_constraint_violation() {
        let store = MemoryStore::default();
        let department = store.insert_department(department_draft("Cardiology")).await.unwrap();
        let created = store.insert_medicine(medicine_draft(department.id)).await.unwrap();

        let err = store
            .update_medicine(created.medicine.id, medicine_draft(department.id + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));

        let stored = store.find_medicine(created.medicine.id).await.unwrap().unwrap();
        assert_eq!(stored.medicine.department_id, department.id);

        assert_internal_error(err).await;
    }

    #[actix_web::test]
    async fn deleting_a_department_removes_its_medicines() {
        let store = MemoryStore::default();
        let cardiology = store.insert_department(department_draft("Cardiology")).await.unwrap();
        let neurology = store.insert_department(department_draft("Neurology")).await.unwrap();
        store.insert_medicine(medicine_draft(cardiology.id)).await.unwrap();
        let kept = store.insert_medicine(medicine_draft(neurology.id)).await.unwrap();

        store.delete_department(cardiology.id).await.unwrap();

        let remaining = store.list_medicines().await.unwrap();
        assert_eq!(remaining, vec![kept]);
        assert!(matches!(
            store.delete_department(cardiology.id).await,
            Err(StoreError::NotFound { entity: "Department", .. })
        ));
    }

    #[actix_web::test]
    async fn update_of_missing_rows_is_not_found() {
        let store = MemoryStore::default();

        let err = store.update_department(4, department_draft("Radiology")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Department", id: 4 }));

        let err = store.update_medicine(4, medicine_draft(1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Medicine", id: 4 }));
    }
}
