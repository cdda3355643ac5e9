// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store;
use crate::summary::installment_mismatches;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

/// Issues found by `doctor`, one `[kind, detail]` row each.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) termijnbedrag != aflossing + rente
    let payments = store::find_all_payments(conn, None)?;
    for p in installment_mismatches(&payments) {
        rows.push(vec![
            "installment_mismatch".into(),
            format!(
                "{} {}: {} != {} + {}",
                p.id, p.date, p.installment, p.principal, p.interest
            ),
        ]);
    }

    // 2) payments pointing at a loan that is gone
    for p in store::find_orphan_payments(conn)? {
        rows.push(vec![
            "orphan_payment".into(),
            format!("{} references missing lening '{}'", p.id, p.loan_id),
        ]);
    }

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
