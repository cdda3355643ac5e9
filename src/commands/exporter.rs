// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::summary::Year;
use crate::utils::required;
use anyhow::{Result, bail};
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("payments", sub)) => export_payments(conn, sub),
        _ => Ok(()),
    }
}

fn export_payments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let range = match sub.get_one::<String>("year") {
        Some(y) => Some(Year::parse(y)?.range()),
        None => None,
    };

    let lenders: HashMap<String, String> = store::find_all_loans(conn)?
        .into_iter()
        .map(|l| (l.id, l.lender))
        .collect();
    let payments = store::find_all_payments(conn, range.as_ref())?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "betaling_id",
                "lening_id",
                "kredietverstrekker",
                "datum",
                "termijnbedrag",
                "aflossing",
                "rente",
                "status",
            ])?;
            for p in &payments {
                let lender = lenders.get(&p.loan_id).cloned().unwrap_or_default();
                wtr.write_record([
                    p.id.clone(),
                    p.loan_id.clone(),
                    lender,
                    p.date.to_string(),
                    p.installment.to_string(),
                    p.principal.to_string(),
                    p.interest.to_string(),
                    p.status.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&payments)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} payments to {}", payments.len(), out);
    Ok(())
}
