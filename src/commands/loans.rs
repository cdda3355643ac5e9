// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Loan, LoanInput, LoanStatus, RateType};
use crate::store;
use crate::utils::{fmt_money, maybe_print_json, optional, parse_date, parse_decimal, pretty_table, required};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            store::delete_loan(conn, id)?;
            println!("Removed lening '{}' and its payments", id);
        }
        _ => {}
    }
    Ok(())
}

/// Build a create request from `loan add` arguments.
pub fn input_from_args(sub: &clap::ArgMatches) -> Result<LoanInput> {
    let rate_type = match sub.get_one::<String>("rate-type") {
        Some(s) => s.parse::<RateType>()?,
        None => RateType::default(),
    };
    let status = match sub.get_one::<String>("status") {
        Some(s) => s.parse::<LoanStatus>()?,
        None => LoanStatus::default(),
    };
    let end_date = match sub.get_one::<String>("end") {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    Ok(LoanInput {
        id: optional(sub, "id"),
        lender: required(sub, "lender")?.to_string(),
        loan_type: required(sub, "type")?.to_string(),
        start_date: parse_date(required(sub, "start")?)?,
        end_date,
        principal: parse_decimal(required(sub, "amount")?)?,
        interest_rate: parse_decimal(required(sub, "rate")?)?,
        rate_type,
        status,
        notes: optional(sub, "note"),
    })
}

/// Overlay the flags given to `loan update` on the stored loan.
pub fn apply_updates(loan: Loan, sub: &clap::ArgMatches) -> Result<LoanInput> {
    let mut input = LoanInput {
        id: None,
        lender: loan.lender,
        loan_type: loan.loan_type,
        start_date: loan.start_date,
        end_date: loan.end_date,
        principal: loan.principal,
        interest_rate: loan.interest_rate,
        rate_type: loan.rate_type,
        status: loan.status,
        notes: loan.notes,
    };
    if let Some(v) = sub.get_one::<String>("lender") {
        input.lender = v.to_string();
    }
    if let Some(v) = sub.get_one::<String>("type") {
        input.loan_type = v.to_string();
    }
    if let Some(v) = sub.get_one::<String>("start") {
        input.start_date = parse_date(v)?;
    }
    if let Some(v) = sub.get_one::<String>("end") {
        // an empty --end clears the end date
        input.end_date = if v.trim().is_empty() {
            None
        } else {
            Some(parse_date(v)?)
        };
    }
    if let Some(v) = sub.get_one::<String>("amount") {
        input.principal = parse_decimal(v)?;
    }
    if let Some(v) = sub.get_one::<String>("rate") {
        input.interest_rate = parse_decimal(v)?;
    }
    if let Some(v) = sub.get_one::<String>("rate-type") {
        input.rate_type = v.parse()?;
    }
    if let Some(v) = sub.get_one::<String>("status") {
        input.status = v.parse()?;
    }
    if let Some(v) = sub.get_one::<String>("note") {
        input.notes = Some(v.to_string());
    }
    Ok(input)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loan = store::create_loan(conn, input_from_args(sub)?)?;
    println!(
        "Added lening '{}' ({}, {}, {})",
        loan.id,
        loan.lender,
        loan.loan_type,
        fmt_money(&loan.principal)
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let current = store::find_loan(conn, id)?;
    let loan = store::update_loan(conn, id, apply_updates(current, sub)?)?;
    println!("Updated lening '{}'", loan.id);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loans = store::find_all_loans(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &loans)? {
        let rows: Vec<Vec<String>> = loans
            .iter()
            .map(|l| {
                vec![
                    l.id.clone(),
                    l.lender.clone(),
                    l.loan_type.clone(),
                    l.start_date.to_string(),
                    l.end_date.map(|d| d.to_string()).unwrap_or_default(),
                    fmt_money(&l.principal),
                    format!("{}% {}", l.interest_rate, l.rate_type),
                    l.status.to_string(),
                    l.notes.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Lender", "Type", "Start", "End", "Amount", "Rate", "Status", "Notes"],
                rows,
            )
        );
    }
    Ok(())
}
