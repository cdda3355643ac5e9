// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST endpoints for loans, payments and the yearly overview.
//!
//! All handlers share one SQLite connection behind a mutex. Storage calls run
//! on actix's blocking pool via [`with_conn`].

pub mod error;
pub mod loans;
pub mod payments;
pub mod reports;

use std::sync::{Mutex, PoisonError};

use actix_web::{HttpResponse, get, web};
use rusqlite::Connection;
use serde_json::json;

pub use error::{ApiError, ApiResult, ErrorCode};

pub struct AppState {
    conn: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

/// Run `f` against the shared connection on the blocking thread pool.
pub async fn with_conn<T, F>(state: &web::Data<AppState>, f: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> crate::error::Result<T> + Send + 'static,
{
    let state = state.clone();
    web::block(move || {
        // a panicking handler must not lock every later request out
        let conn = state.conn.lock().unwrap_or_else(PoisonError::into_inner);
        f(&conn).map_err(ApiError::from)
    })
    .await?
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Register every `/api` route plus the health check.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::new(ErrorCode::InvalidRequest, err.to_string()).into()
    });
    let query = web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::new(ErrorCode::InvalidRequest, err.to_string()).into()
    });
    cfg.app_data(json).app_data(query).service(health).service(
        web::scope("/api")
            .service(loans::list_loans)
            .service(loans::create_loan)
            .service(loans::update_loan)
            .service(loans::delete_loan)
            .service(payments::list_payments)
            .service(payments::create_payment)
            .service(payments::update_payment)
            .service(payments::delete_payment)
            .service(reports::monthly)
            .service(reports::yearly_summary)
            .service(reports::dashboard)
            .service(reports::lenders),
    );
}
