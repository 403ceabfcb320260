use actix_web::{web, HttpResponse};

use qingsu_db::connection::{Conn, PgPool};

use error::AppError;

pub fn pool_conn(pool: &web::Data<PgPool>) -> Result<Conn, AppError> {
    pool.get().map_err(|e| AppError::Pool(e.to_string()))
}

/// 业务规则拦下的请求本身是成功的，用 200 + 提示语回
pub fn flash_err(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": false, "message": message }))
}

pub use routes::configure_service;

pub mod auth;
pub mod captcha;
pub mod config;
pub mod error;
pub mod gate;
pub mod jobs;
pub mod models;
pub mod workflow;
pub mod xlsx;
mod routes;
