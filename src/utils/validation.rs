use chrono::Utc;
use log::warn;
use validator::{Validate, ValidationError, ValidationErrors};
use crate::db::Store;
use crate::errors::{AppError, FieldErrors};
use crate::models::department::{Department, DepartmentDraft, DepartmentPayload};
use crate::models::medicine::{MedicineDraft, MedicinePayload};

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate()
        .map_err(|err| AppError::Validation(field_errors(&err)))
}

/// Rejects strings made only of whitespace. Reported under the `required` code.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Path and payload must name the same entity on a full-replace update.
pub fn ensure_id_matches(path_id: i32, payload_id: Option<i32>) -> Result<(), AppError> {
    if payload_id != Some(path_id) {
        return Err(AppError::IdMismatch);
    }
    Ok(())
}

/// Validates a department body and stamps `updated_at`.
pub fn department_draft(payload: DepartmentPayload) -> Result<DepartmentDraft, AppError> {
    validate_payload(&payload)?;

    Ok(DepartmentDraft {
        // `required` has already rejected `None`.
        name: payload.name.unwrap_or_default(),
        updated_by: payload.updated_by,
        updated_at: Utc::now(),
    })
}

/// Validates a medicine body and stamps `updated_at`. The department reference
/// is checked separately by [`ensure_department_reference`].
pub fn medicine_draft(payload: MedicinePayload) -> Result<MedicineDraft, AppError> {
    validate_payload(&payload)?;

    Ok(MedicineDraft {
        department_id: payload.department_id.unwrap_or_default(),
        name: payload.name.unwrap_or_default(),
        description: payload.description,
        quantity: payload.quantity.unwrap_or_default(),
        image_url: payload.image_url,
        updated_by: payload.updated_by,
        updated_at: Utc::now(),
    })
}

/// A medicine may only point at an existing department. `current` is the
/// stored reference on update; an unchanged reference is not looked up again.
pub async fn ensure_department_reference(
    store: &dyn Store,
    department_id: i32,
    current: Option<i32>,
) -> Result<Option<Department>, AppError> {
    if current == Some(department_id) {
        return Ok(None);
    }

    match store.find_department(department_id).await? {
        Some(department) => Ok(Some(department)),
        None => {
            warn!("Department with ID {} does not exist", department_id);
            Err(AppError::MissingDepartment(department_id))
        }
    }
}

fn field_errors(err: &ValidationErrors) -> FieldErrors {
    err.field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let field = camel_case(field);
            let messages = errors.iter().map(|error| describe(&field, error)).collect();
            (field, messages)
        })
        .collect()
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "required" => format!("The {} field is required.", field),
        "length" => match error.params.get("max") {
            Some(max) => format!("The field {} must be a string with a maximum length of {}.", field, max),
            None => format!("The field {} has an invalid length.", field),
        },
        "range" => match error.params.get("min") {
            Some(min) => format!("The field {} must be at least {}.", field, min),
            None => format!("The field {} is out of range.", field),
        },
        code => format!("The field {} is invalid ({}).", field, code),
    }
}

/// `updated_by` -> `updatedBy`, matching the JSON field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
