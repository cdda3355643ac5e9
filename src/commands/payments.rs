// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Payment, PaymentInput, PaymentStatus};
use crate::store;
use crate::summary::Year;
use crate::utils::{fmt_money, maybe_print_json, optional, parse_date, parse_decimal, pretty_table, required};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            store::delete_payment(conn, id)?;
            println!("Removed betaling '{}'", id);
        }
        _ => {}
    }
    Ok(())
}

fn split_total(principal: Decimal, interest: Decimal) -> Result<Decimal> {
    principal
        .checked_add(interest)
        .context("Principal plus interest is out of range")
}

pub fn input_from_args(sub: &clap::ArgMatches) -> Result<PaymentInput> {
    let principal = parse_decimal(required(sub, "principal")?)?;
    let interest = parse_decimal(required(sub, "interest")?)?;
    let installment = match sub.get_one::<String>("amount") {
        Some(s) => parse_decimal(s)?,
        None => split_total(principal, interest)?,
    };
    let status = match sub.get_one::<String>("status") {
        Some(s) => s.parse::<PaymentStatus>()?,
        None => PaymentStatus::default(),
    };
    Ok(PaymentInput {
        id: optional(sub, "id"),
        loan_id: required(sub, "loan")?.to_string(),
        date: parse_date(required(sub, "date")?)?,
        installment,
        principal,
        interest,
        status,
    })
}

pub fn apply_updates(p: Payment, sub: &clap::ArgMatches) -> Result<PaymentInput> {
    let mut input = PaymentInput {
        id: None,
        loan_id: p.loan_id,
        date: p.date,
        installment: p.installment,
        principal: p.principal,
        interest: p.interest,
        status: p.status,
    };
    if let Some(v) = sub.get_one::<String>("loan") {
        input.loan_id = v.to_string();
    }
    if let Some(v) = sub.get_one::<String>("date") {
        input.date = parse_date(v)?;
    }
    let split_changed = sub.contains_id("principal") || sub.contains_id("interest");
    if let Some(v) = sub.get_one::<String>("principal") {
        input.principal = parse_decimal(v)?;
    }
    if let Some(v) = sub.get_one::<String>("interest") {
        input.interest = parse_decimal(v)?;
    }
    match sub.get_one::<String>("amount") {
        Some(v) => input.installment = parse_decimal(v)?,
        // keep the installment consistent with a new split
        None if split_changed => {
            input.installment = split_total(input.principal, input.interest)?
        }
        None => {}
    }
    if let Some(v) = sub.get_one::<String>("status") {
        input.status = v.parse()?;
    }
    Ok(input)
}

/// Payments matching the `payment list` filters, newest first.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Payment>> {
    let range = match sub.get_one::<String>("year") {
        Some(y) => Some(Year::parse(y)?.range()),
        None => None,
    };
    let mut data = store::find_all_payments(conn, range.as_ref())?;
    if let Some(loan) = sub.get_one::<String>("loan") {
        data.retain(|p| &p.loan_id == loan);
    }
    data.reverse();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let p = store::create_payment(conn, input_from_args(sub)?)?;
    println!(
        "Recorded {} on {} for lening '{}' (aflossing {}, rente {})",
        fmt_money(&p.installment),
        p.date,
        p.loan_id,
        fmt_money(&p.principal),
        fmt_money(&p.interest)
    );
    if !p.is_balanced() {
        println!("Note: termijnbedrag differs from aflossing + rente");
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let current = store::find_payment(conn, id)?;
    let p = store::update_payment(conn, id, apply_updates(current, sub)?)?;
    println!("Updated betaling '{}'", p.id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|p| {
                vec![
                    p.id.clone(),
                    p.date.to_string(),
                    p.loan_id.clone(),
                    fmt_money(&p.installment),
                    fmt_money(&p.principal),
                    fmt_money(&p.interest),
                    p.status.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Loan", "Installment", "Principal", "Interest", "Status"],
                rows,
            )
        );
    }
    Ok(())
}
