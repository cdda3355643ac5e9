// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `/api/leningen` handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use tracing::info;

use super::{ApiResult, AppState, with_conn};
use crate::models::{Loan, LoanInput};
use crate::store;

#[get("/leningen")]
pub async fn list_loans(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<Loan>>> {
    let loans = with_conn(&state, store::find_all_loans).await?;
    Ok(web::Json(loans))
}

#[post("/leningen")]
pub async fn create_loan(
    state: web::Data<AppState>,
    body: web::Json<LoanInput>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    let loan = with_conn(&state, move |conn| store::create_loan(conn, input)).await?;
    info!(lening_id = %loan.id, "lening created");
    Ok(HttpResponse::Created().json(loan))
}

#[put("/leningen/{id}")]
pub async fn update_loan(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<LoanInput>,
) -> ApiResult<web::Json<Loan>> {
    let id = path.into_inner();
    let input = body.into_inner();
    let loan = with_conn(&state, move |conn| store::update_loan(conn, &id, input)).await?;
    info!(lening_id = %loan.id, "lening updated");
    Ok(web::Json(loan))
}

#[delete("/leningen/{id}")]
pub async fn delete_loan(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let deleted = id.clone();
    with_conn(&state, move |conn| store::delete_loan(conn, &id)).await?;
    info!(lening_id = %deleted, "lening deleted");
    Ok(HttpResponse::NoContent().finish())
}
