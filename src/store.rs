// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed storage for loans and payments.
//!
//! Every write goes through the same validation, so the HTTP handlers and the
//! CLI share one set of rules. Payments reference loans by `lening_id`; the
//! reference is checked here before the row is written.

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{DateRange, Loan, LoanInput, Payment, PaymentInput};

const MAX_ID_LEN: usize = 64;
// rentepercentage is a DECIMAL(5,2) percentage.
const MAX_RATE: Decimal = Decimal::ONE_THOUSAND;
// 10^13: amounts are DECIMAL(15,2).
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_316_134_912, 2_328, 0, false, 0);

const LOAN_COLUMNS: &str = "lening_id, kredietverstrekker, type, startdatum, einddatum, bedrag, \
     rentepercentage, rentetype, status, opmerkingen, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "b.betaling_id, b.lening_id, b.datum, b.termijnbedrag, b.aflossing, \
     b.rente, b.status, b.created_at, b.updated_at";

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    Decimal::from_str(s.trim()).map_err(|e| conversion_err(idx, e))
}

fn parsed_at<T>(r: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = Error>,
{
    let s: String = r.get(idx)?;
    s.parse::<T>().map_err(|e| conversion_err(idx, e))
}

fn loan_from_row(r: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: r.get(0)?,
        lender: r.get(1)?,
        loan_type: r.get(2)?,
        start_date: r.get(3)?,
        end_date: r.get(4)?,
        principal: decimal_at(r, 5)?,
        interest_rate: decimal_at(r, 6)?,
        rate_type: parsed_at(r, 7)?,
        status: parsed_at(r, 8)?,
        notes: r.get(9)?,
        created_at: r.get(10)?,
        updated_at: r.get(11)?,
    })
}

fn payment_from_row(r: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: r.get(0)?,
        loan_id: r.get(1)?,
        date: r.get(2)?,
        installment: decimal_at(r, 3)?,
        principal: decimal_at(r, 4)?,
        interest: decimal_at(r, 5)?,
        status: parsed_at(r, 6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

fn check_id(kind: &str, id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::validation(format!("{} must not be empty", kind)));
    }
    if id.len() > MAX_ID_LEN || id.contains('/') {
        return Err(Error::validation(format!(
            "{} '{}' is not a valid identifier",
            kind, id
        )));
    }
    Ok(id.to_string())
}

fn non_negative(field: &str, v: Decimal) -> Result<Decimal> {
    if v < Decimal::ZERO {
        return Err(Error::validation(format!("{} must not be negative", field)));
    }
    // two decimals, ties away from zero like a NUMERIC(15,2) column
    let mut v = v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if v >= MAX_AMOUNT {
        return Err(Error::validation(format!(
            "{} must be below {}",
            field, MAX_AMOUNT
        )));
    }
    v.rescale(2);
    Ok(v)
}

fn required_text(field: &str, v: &str) -> Result<String> {
    let v = v.trim();
    if v.is_empty() {
        return Err(Error::validation(format!("{} is required", field)));
    }
    Ok(v.to_string())
}

fn normalize_loan(input: LoanInput) -> Result<LoanInput> {
    if let Some(end) = input.end_date {
        if end < input.start_date {
            return Err(Error::validation(format!(
                "einddatum {} lies before startdatum {}",
                end, input.start_date
            )));
        }
    }
    let interest_rate = non_negative("rentepercentage", input.interest_rate)?;
    if interest_rate >= MAX_RATE {
        return Err(Error::validation(format!(
            "rentepercentage {} is out of range",
            interest_rate
        )));
    }
    Ok(LoanInput {
        id: input.id,
        lender: required_text("kredietverstrekker", &input.lender)?,
        loan_type: required_text("type", &input.loan_type)?,
        start_date: input.start_date,
        end_date: input.end_date,
        principal: non_negative("bedrag", input.principal)?,
        interest_rate,
        rate_type: input.rate_type,
        status: input.status,
        notes: input
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
    })
}

fn normalize_payment(input: PaymentInput) -> Result<PaymentInput> {
    Ok(PaymentInput {
        id: input.id,
        loan_id: check_id("lening_id", &input.loan_id)?,
        date: input.date,
        installment: non_negative("termijnbedrag", input.installment)?,
        principal: non_negative("aflossing", input.principal)?,
        interest: non_negative("rente", input.interest)?,
        status: input.status,
    })
}

// Identifiers are immutable: an update may repeat the id but never change it.
fn check_immutable_id(kind: &str, path_id: &str, body_id: Option<&str>) -> Result<()> {
    match body_id.map(str::trim) {
        Some(b) if b != path_id => Err(Error::validation(format!(
            "{} is immutable ('{}' cannot become '{}')",
            kind, path_id, b
        ))),
        _ => Ok(()),
    }
}

fn map_insert_err(kind: &str, id: &str, e: rusqlite::Error) -> Error {
    if Error::is_unique_violation(&e) {
        Error::Conflict(format!("{} '{}' already exists", kind, id))
    } else {
        Error::from(e)
    }
}

pub fn find_all_loans(conn: &Connection) -> Result<Vec<Loan>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM leningen ORDER BY startdatum, lening_id",
        LOAN_COLUMNS
    ))?;
    let rows = stmt.query_map([], loan_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn find_loan(conn: &Connection, id: &str) -> Result<Loan> {
    conn.query_row(
        &format!("SELECT {} FROM leningen WHERE lening_id=?1", LOAN_COLUMNS),
        params![id],
        loan_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("lening", id))
}

pub fn loan_exists(conn: &Connection, id: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM leningen WHERE lening_id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn create_loan(conn: &Connection, input: LoanInput) -> Result<Loan> {
    let input = normalize_loan(input)?;
    let id = match input.id.as_deref() {
        Some(id) => check_id("lening_id", id)?,
        None => Uuid::new_v4().to_string(),
    };
    conn.execute(
        "INSERT INTO leningen(lening_id, kredietverstrekker, type, startdatum, einddatum, bedrag,
                              rentepercentage, rentetype, status, opmerkingen)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            input.lender,
            input.loan_type,
            input.start_date,
            input.end_date,
            input.principal.to_string(),
            input.interest_rate.to_string(),
            input.rate_type.as_str(),
            input.status.as_str(),
            input.notes,
        ],
    )
    .map_err(|e| map_insert_err("lening", &id, e))?;
    find_loan(conn, &id)
}

pub fn update_loan(conn: &Connection, id: &str, input: LoanInput) -> Result<Loan> {
    check_immutable_id("lening_id", id, input.id.as_deref())?;
    let input = normalize_loan(input)?;
    let changed = conn.execute(
        "UPDATE leningen SET kredietverstrekker=?2, type=?3, startdatum=?4, einddatum=?5,
                bedrag=?6, rentepercentage=?7, rentetype=?8, status=?9, opmerkingen=?10,
                updated_at=datetime('now')
         WHERE lening_id=?1",
        params![
            id,
            input.lender,
            input.loan_type,
            input.start_date,
            input.end_date,
            input.principal.to_string(),
            input.interest_rate.to_string(),
            input.rate_type.as_str(),
            input.status.as_str(),
            input.notes,
        ],
    )?;
    if changed == 0 {
        return Err(Error::not_found("lening", id));
    }
    find_loan(conn, id)
}

/// Delete a loan. Its payments go with it (`ON DELETE CASCADE`).
pub fn delete_loan(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM leningen WHERE lening_id=?1", params![id])?;
    if changed == 0 {
        return Err(Error::not_found("lening", id));
    }
    Ok(())
}

/// All payments, or only those dated within `range` (bounds inclusive).
pub fn find_all_payments(conn: &Connection, range: Option<&DateRange>) -> Result<Vec<Payment>> {
    let mut data = Vec::new();
    match range {
        Some(range) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM betalingen b WHERE b.datum BETWEEN ?1 AND ?2
                 ORDER BY b.datum, b.betaling_id",
                PAYMENT_COLUMNS
            ))?;
            let rows = stmt.query_map(params![range.start, range.end], payment_from_row)?;
            for row in rows {
                data.push(row?);
            }
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM betalingen b ORDER BY b.datum, b.betaling_id",
                PAYMENT_COLUMNS
            ))?;
            let rows = stmt.query_map([], payment_from_row)?;
            for row in rows {
                data.push(row?);
            }
        }
    }
    Ok(data)
}

pub fn find_payment(conn: &Connection, id: &str) -> Result<Payment> {
    conn.query_row(
        &format!(
            "SELECT {} FROM betalingen b WHERE b.betaling_id=?1",
            PAYMENT_COLUMNS
        ),
        params![id],
        payment_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("betaling", id))
}

pub fn create_payment(conn: &Connection, input: PaymentInput) -> Result<Payment> {
    let input = normalize_payment(input)?;
    if !loan_exists(conn, &input.loan_id)? {
        return Err(Error::UnknownLoan(input.loan_id));
    }
    let id = match input.id.as_deref() {
        Some(id) => check_id("betaling_id", id)?,
        None => Uuid::new_v4().to_string(),
    };
    conn.execute(
        "INSERT INTO betalingen(betaling_id, lening_id, datum, termijnbedrag, aflossing, rente, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            input.loan_id,
            input.date,
            input.installment.to_string(),
            input.principal.to_string(),
            input.interest.to_string(),
            input.status.as_str(),
        ],
    )
    .map_err(|e| map_insert_err("betaling", &id, e))?;
    find_payment(conn, &id)
}

pub fn update_payment(conn: &Connection, id: &str, input: PaymentInput) -> Result<Payment> {
    check_immutable_id("betaling_id", id, input.id.as_deref())?;
    let input = normalize_payment(input)?;
    // 404 for the payment wins over a bad loan reference.
    find_payment(conn, id)?;
    if !loan_exists(conn, &input.loan_id)? {
        return Err(Error::UnknownLoan(input.loan_id));
    }
    conn.execute(
        "UPDATE betalingen SET lening_id=?2, datum=?3, termijnbedrag=?4, aflossing=?5, rente=?6,
                status=?7, updated_at=datetime('now')
         WHERE betaling_id=?1",
        params![
            id,
            input.loan_id,
            input.date,
            input.installment.to_string(),
            input.principal.to_string(),
            input.interest.to_string(),
            input.status.as_str(),
        ],
    )?;
    find_payment(conn, id)
}

pub fn delete_payment(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM betalingen WHERE betaling_id=?1", params![id])?;
    if changed == 0 {
        return Err(Error::not_found("betaling", id));
    }
    Ok(())
}

/// Payments whose loan no longer exists. Only databases written with
/// foreign keys disabled can contain these.
pub fn find_orphan_payments(conn: &Connection) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM betalingen b LEFT JOIN leningen l ON b.lening_id=l.lening_id
         WHERE l.lening_id IS NULL ORDER BY b.datum, b.betaling_id",
        PAYMENT_COLUMNS
    ))?;
    let rows = stmt.query_map([], payment_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
