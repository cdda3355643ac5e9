// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only report endpoints.
//!
//! The year segment is validated before any query runs, so a malformed year
//! never touches the database.

use actix_web::{get, web};

use super::{ApiResult, AppState, with_conn};
use crate::store;
use crate::summary::{self, Dashboard, LenderShare, MonthTotals, Year, YearlySummary};

#[get("/jaaroverzicht/{jaar}")]
pub async fn yearly_summary(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<YearlySummary>> {
    let year = Year::parse(&path)?;
    let summary = with_conn(&state, move |conn| {
        let loans = store::find_all_loans(conn)?;
        let payments = store::find_all_payments(conn, Some(&year.range()))?;
        summary::compute_yearly_summary(year, &loans, &payments)
    })
    .await?;
    Ok(web::Json(summary))
}

#[get("/jaaroverzicht/{jaar}/maanden")]
pub async fn monthly(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<MonthTotals>>> {
    let year = Year::parse(&path)?;
    let months = with_conn(&state, move |conn| {
        let payments = store::find_all_payments(conn, Some(&year.range()))?;
        summary::monthly_breakdown(year, &payments)
    })
    .await?;
    Ok(web::Json(months))
}

#[get("/dashboard/{jaar}")]
pub async fn dashboard(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Dashboard>> {
    let year = Year::parse(&path)?;
    let totals = with_conn(&state, move |conn| {
        let loans = store::find_all_loans(conn)?;
        let payments = store::find_all_payments(conn, Some(&year.range()))?;
        summary::dashboard(year, &loans, &payments)
    })
    .await?;
    Ok(web::Json(totals))
}

#[get("/verstrekkers")]
pub async fn lenders(state: web::Data<AppState>) -> ApiResult<web::Json<Vec<LenderShare>>> {
    let loans = with_conn(&state, store::find_all_loans).await?;
    Ok(web::Json(summary::lender_distribution(&loans)?))
}
