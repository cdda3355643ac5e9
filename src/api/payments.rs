// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `/api/betalingen` handlers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;
use tracing::info;

use super::{ApiResult, AppState, with_conn};
use crate::models::{Payment, PaymentInput};
use crate::store;
use crate::summary::Year;

#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    jaar: Option<String>,
}

#[get("/betalingen")]
pub async fn list_payments(
    state: web::Data<AppState>,
    query: web::Query<PaymentQuery>,
) -> ApiResult<web::Json<Vec<Payment>>> {
    let range = match query.jaar.as_deref() {
        Some(raw) => Some(Year::parse(raw)?.range()),
        None => None,
    };
    let payments = with_conn(&state, move |conn| {
        store::find_all_payments(conn, range.as_ref())
    })
    .await?;
    Ok(web::Json(payments))
}

#[post("/betalingen")]
pub async fn create_payment(
    state: web::Data<AppState>,
    body: web::Json<PaymentInput>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    let payment = with_conn(&state, move |conn| store::create_payment(conn, input)).await?;
    info!(betaling_id = %payment.id, lening_id = %payment.loan_id, "betaling created");
    Ok(HttpResponse::Created().json(payment))
}

#[put("/betalingen/{id}")]
pub async fn update_payment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<PaymentInput>,
) -> ApiResult<web::Json<Payment>> {
    let id = path.into_inner();
    let input = body.into_inner();
    let payment = with_conn(&state, move |conn| store::update_payment(conn, &id, input)).await?;
    info!(betaling_id = %payment.id, "betaling updated");
    Ok(web::Json(payment))
}

#[delete("/betalingen/{id}")]
pub async fn delete_payment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let deleted = id.clone();
    with_conn(&state, move |conn| store::delete_payment(conn, &id)).await?;
    info!(betaling_id = %deleted, "betaling deleted");
    Ok(HttpResponse::NoContent().finish())
}
