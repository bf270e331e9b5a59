use actix_web::{http::header, web, HttpRequest, HttpResponse};
use log::{info, warn};
use crate::db::{Store, StoreError};
use crate::errors::AppError;
use crate::models::medicine::MedicinePayload;
use crate::utils::validation;

pub async fn get_medicines(
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let medicines = store.list_medicines().await?;

    info!("Retrieved {} medicines", medicines.len());
    Ok(HttpResponse::Ok().json(medicines))
}

pub async fn get_medicine(
    store: web::Data<dyn Store>,
    medicine_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let medicine_id = medicine_id.into_inner();

    match store.find_medicine(medicine_id).await? {
        Some(medicine) => {
            info!("Retrieved medicine with ID {}", medicine_id);
            Ok(HttpResponse::Ok().json(medicine))
        }
        None => {
            warn!("Medicine with ID {} not found", medicine_id);
            Err(AppError::not_found("Medicine", medicine_id))
        }
    }
}

pub async fn get_medicines_by_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let department_id = department_id.into_inner();
    let medicines = store.list_medicines_by_department(department_id).await?;

    info!("Retrieved {} medicines for department {}", medicines.len(), department_id);
    Ok(HttpResponse::Ok().json(medicines))
}

pub async fn create_medicine(
    req: HttpRequest,
    store: web::Data<dyn Store>,
    new_medicine: web::Json<MedicinePayload>,
) -> Result<HttpResponse, AppError> {
    let draft = validation::medicine_draft(new_medicine.into_inner())?;
    validation::ensure_department_reference(store.get_ref(), draft.department_id, None).await?;

    let medicine = store.insert_medicine(draft).await?;
    let location = req.url_for("medicine", [medicine.medicine.id.to_string()])?;

    info!("Created medicine with ID {}", medicine.medicine.id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.to_string()))
        .json(medicine))
}

pub async fn update_medicine(
    store: web::Data<dyn Store>,
    medicine_id: web::Path<i32>,
    updates: web::Json<MedicinePayload>,
) -> Result<HttpResponse, AppError> {
    let medicine_id = medicine_id.into_inner();
    let updates = updates.into_inner();

    validation::ensure_id_matches(medicine_id, updates.id)?;
    let draft = validation::medicine_draft(updates)?;

    let existing = match store.find_medicine(medicine_id).await? {
        Some(existing) => existing,
        None => {
            warn!("Medicine with ID {} not found for update", medicine_id);
            return Err(AppError::not_found("Medicine", medicine_id));
        }
    };

    validation::ensure_department_reference(
        store.get_ref(),
        draft.department_id,
        Some(existing.medicine.department_id),
    )
    .await?;

    let medicine = store
        .update_medicine(medicine_id, draft)
        .await
        .map_err(StoreError::vanished)?;

    info!("Updated medicine with ID {}", medicine_id);
    Ok(HttpResponse::Ok().json(medicine))
}

pub async fn delete_medicine(
    store: web::Data<dyn Store>,
    medicine_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let medicine_id = medicine_id.into_inner();

    match store.delete_medicine(medicine_id).await {
        Ok(()) => {
            info!("Deleted medicine with ID {}", medicine_id);
            Ok(HttpResponse::NoContent().finish())
        }
        Err(StoreError::NotFound { .. }) => {
            warn!("Medicine with ID {} not found for deletion", medicine_id);
            Err(AppError::not_found("Medicine", medicine_id))
        }
        Err(err) => Err(err.into()),
    }
}
