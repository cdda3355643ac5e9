// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::summary::{self, Year, YearlySummary};
use crate::utils::{fmt_money, maybe_print_json, pretty_table, required};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("year", sub)) => year(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("lenders", sub)) => lenders(conn, sub)?,
        Some(("dashboard", sub)) => dashboard(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Fetch loans and the year's payments, then aggregate per loan.
pub fn yearly_summary(conn: &Connection, year: Year) -> Result<YearlySummary> {
    let loans = store::find_all_loans(conn)?;
    let payments = store::find_all_payments(conn, Some(&year.range()))?;
    Ok(summary::compute_yearly_summary(year, &loans, &payments)?)
}

fn year(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = Year::parse(required(sub, "year")?)?;
    let data = yearly_summary(conn, year)?;
    // --jsonl streams one loan per line instead of the keyed object
    let listed: Vec<_> = data.values().collect();
    if !maybe_print_json(sub.get_flag("json"), false, &data)?
        && !maybe_print_json(false, sub.get_flag("jsonl"), &listed)?
    {
        let mut total_principal = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        let mut rows = Vec::new();
        for s in data.values() {
            total_principal = total_principal
                .checked_add(s.total_principal)
                .context("Principal total overflowed")?;
            total_interest = total_interest
                .checked_add(s.total_interest)
                .context("Interest total overflowed")?;
            rows.push(vec![
                s.loan_id.clone(),
                s.lender.clone(),
                fmt_money(&s.total_principal),
                fmt_money(&s.total_interest),
            ]);
        }
        if !rows.is_empty() {
            rows.push(vec![
                "Total".into(),
                String::new(),
                fmt_money(&total_principal),
                fmt_money(&total_interest),
            ]);
        }
        let principal_header = format!("Principal {}", year);
        let interest_header = format!("Interest {}", year);
        println!(
            "{}",
            pretty_table(
                &["Loan", "Lender", principal_header.as_str(), interest_header.as_str()],
                rows,
            )
        );
    }
    Ok(())
}

fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = Year::parse(required(sub, "year")?)?;
    let payments = store::find_all_payments(conn, Some(&year.range()))?;
    let data = summary::monthly_breakdown(year, &payments)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    format!("{}-{:02}", year, m.month),
                    fmt_money(&m.principal),
                    fmt_money(&m.interest),
                    fmt_money(&m.total),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Principal", "Interest", "Total"], rows)
        );
    }
    Ok(())
}

fn lenders(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let loans = store::find_all_loans(conn)?;
    let data = summary::lender_distribution(&loans)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|s| vec![s.lender.clone(), s.loans.to_string(), fmt_money(&s.principal)])
            .collect();
        println!("{}", pretty_table(&["Lender", "Loans", "Principal"], rows));
    }
    Ok(())
}

fn dashboard(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let year = Year::parse(required(sub, "year")?)?;
    let loans = store::find_all_loans(conn)?;
    let payments = store::find_all_payments(conn, Some(&year.range()))?;
    let d = summary::dashboard(year, &loans, &payments)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &d)? {
        let rows = vec![
            vec!["Total borrowed".into(), fmt_money(&d.totaal_leenbedrag)],
            vec![format!("Principal {}", year), fmt_money(&d.totaal_aflossing)],
            vec![format!("Interest {}", year), fmt_money(&d.totaal_rente)],
            vec![format!("Payments {}", year), d.aantal_betalingen.to_string()],
            vec!["Active loans".into(), d.lopende_leningen.to_string()],
        ];
        println!("{}", pretty_table(&["", "Value"], rows));
    }
    Ok(())
}
