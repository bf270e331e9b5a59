use actix_web::{http::header, web, HttpRequest, HttpResponse};
use log::{info, warn};
use crate::db::{Store, StoreError};
use crate::errors::AppError;
use crate::models::department::DepartmentPayload;
use crate::utils::validation;

pub async fn get_departments(
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let departments = store.list_departments().await?;

    info!("Retrieved {} departments", departments.len());
    Ok(HttpResponse::Ok().json(departments))
}

pub async fn get_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let department_id = department_id.into_inner();

    match store.find_department(department_id).await? {
        Some(department) => {
            info!("Retrieved department with ID {}", department_id);
            Ok(HttpResponse::Ok().json(department))
        }
        None => {
            warn!("Department with ID {} not found", department_id);
            Err(AppError::not_found("Department", department_id))
        }
    }
}

pub async fn create_department(
    req: HttpRequest,
    store: web::Data<dyn Store>,
    new_department: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    let draft = validation::department_draft(new_department.into_inner())?;

    let department = store.insert_department(draft).await?;
    let location = req.url_for("department", [department.id.to_string()])?;

    info!("Created department with ID {}", department.id);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location.to_string()))
        .json(department))
}

pub async fn update_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<i32>,
    updates: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    let department_id = department_id.into_inner();
    let updates = updates.into_inner();

    validation::ensure_id_matches(department_id, updates.id)?;
    let draft = validation::department_draft(updates)?;

    if store.find_department(department_id).await?.is_none() {
        warn!("Department with ID {} not found for update", department_id);
        return Err(AppError::not_found("Department", department_id));
    }

    let department = store
        .update_department(department_id, draft)
        .await
        .map_err(StoreError::vanished)?;

    info!("Updated department with ID {}", department_id);
    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    store: web::Data<dyn Store>,
    department_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let department_id = department_id.into_inner();

    match store.delete_department(department_id).await {
        Ok(()) => {
            info!("Deleted department with ID {}", department_id);
            Ok(HttpResponse::NoContent().finish())
        }
        Err(StoreError::NotFound { .. }) => {
            warn!("Department with ID {} not found for deletion", department_id);
            Err(AppError::not_found("Department", department_id))
        }
        Err(err) => Err(err.into()),
    }
}
