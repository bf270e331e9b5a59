mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use log::{info, warn};
use crate::config::Config;
use crate::db::PgStore;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    // Initialize the database pool
    let pool = db::create_pool(&config).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
        info!("Database schema is up to date");
    }

    let store = routes::store_data(PgStore::new(pool));

    warn!("CORS allows any origin, method and header");
    info!("Starting server at {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
