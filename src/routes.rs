use actix_web::{web, HttpRequest};
use std::sync::Arc;
use crate::db::Store;
use crate::errors::AppError;
use crate::handlers;

pub fn store_data<S: Store + 'static>(store: S) -> web::Data<dyn Store> {
    let store: Arc<dyn Store> = Arc::new(store);
    web::Data::from(store)
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req: &HttpRequest| AppError::BadRequest(err.to_string()).into())
}

/// Registers the health probe and both resources under `/api`. Shared by the
/// server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .route("/health", web::get().to(handlers::health::health_check))
        .service(
            web::scope("/api")
                .service(
                    web::resource("/departments")
                        .route(web::get().to(handlers::department::get_departments))
                        .route(web::post().to(handlers::department::create_department)),
                )
                .service(
                    web::resource("/departments/{id}")
                        .name("department")
                        .route(web::get().to(handlers::department::get_department))
                        .route(web::put().to(handlers::department::update_department))
                        .route(web::delete().to(handlers::department::delete_department)),
                )
                .service(
                    web::resource("/medicines")
                        .route(web::get().to(handlers::medicine::get_medicines))
                        .route(web::post().to(handlers::medicine::create_medicine)),
                )
                .service(
                    web::resource("/medicines/department/{dept_id}")
                        .route(web::get().to(handlers::medicine::get_medicines_by_department)),
                )
                .service(
                    web::resource("/medicines/{id}")
                        .name("medicine")
                        .route(web::get().to(handlers::medicine::get_medicine))
                        .route(web::put().to(handlers::medicine::update_medicine))
                        .route(web::delete().to(handlers::medicine::delete_medicine)),
                ),
        );
}
