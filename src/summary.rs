// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Year-based aggregations over loans and payments.
//!
//! Everything here is a pure function of its inputs. The callers fetch the
//! collections (payments usually pre-filtered with [`Year::range`]) and hand
//! them in; amounts are summed as [`Decimal`] so totals are exact to the cent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{DateRange, Loan, LoanStatus, Payment};

pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

/// A validated calendar year, always four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    pub fn new(year: i32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(Error::validation(format!(
                "jaar {} is out of range ({}-{})",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        Ok(Year(year))
    }

    /// Parse a year as it arrives in a URL segment or on the command line.
    pub fn parse(raw: &str) -> Result<Self> {
        let s = raw.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "jaar '{}' is not a valid year",
                raw
            )));
        }
        // all digits, so only overflow can fail here
        let year = s
            .parse::<i32>()
            .map_err(|_| Error::validation(format!("jaar '{}' is out of range", raw)))?;
        Year::new(year)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn first_day(self) -> NaiveDate {
        // 1000..=9999 are all representable
        NaiveDate::from_ymd_opt(self.0, 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 12, 31).unwrap_or(NaiveDate::MAX)
    }

    /// `YYYY-01-01 ..= YYYY-12-31`
    pub fn range(self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.0
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the yearly overview (`jaaroverzicht`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanYearSummary {
    #[serde(rename = "lening_id")]
    pub loan_id: String,
    #[serde(rename = "kredietverstrekker")]
    pub lender: String,
    #[serde(rename = "totaal_aflossing")]
    pub total_principal: Decimal,
    #[serde(rename = "totaal_rente")]
    pub total_interest: Decimal,
}

pub type YearlySummary = BTreeMap<String, LoanYearSummary>;

fn add(total: Decimal, amount: Decimal, what: &'static str) -> Result<Decimal> {
    total.checked_add(amount).ok_or(Error::Overflow(what))
}

/// Per-loan principal and interest paid in `year`.
///
/// Loans without a payment dated in `year` are left out. Payments dated
/// outside the year are ignored even if the caller passed them in.
pub fn compute_yearly_summary(
    year: Year,
    loans: &[Loan],
    payments: &[Payment],
) -> Result<YearlySummary> {
    let mut summary = BTreeMap::new();
    for loan in loans {
        let mut matched = false;
        let mut total_principal = Decimal::ZERO;
        let mut total_interest = Decimal::ZERO;
        for p in payments
            .iter()
            .filter(|p| p.loan_id == loan.id && year.contains(p.date))
        {
            matched = true;
            total_principal = add(total_principal, p.principal, "totaal_aflossing")?;
            total_interest = add(total_interest, p.interest, "totaal_rente")?;
        }
        if matched {
            summary.insert(
                loan.id.clone(),
                LoanYearSummary {
                    loan_id: loan.id.clone(),
                    lender: loan.lender.clone(),
                    total_principal,
                    total_interest,
                },
            );
        }
    }
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    #[serde(rename = "maand")]
    pub month: u32,
    #[serde(rename = "aflossing")]
    pub principal: Decimal,
    #[serde(rename = "rente")]
    pub interest: Decimal,
    #[serde(rename = "totaal")]
    pub total: Decimal,
}

/// Principal and interest per calendar month of `year`, January first.
pub fn monthly_breakdown(year: Year, payments: &[Payment]) -> Result<Vec<MonthTotals>> {
    let mut months: Vec<MonthTotals> = (1..=12)
        .map(|month| MonthTotals {
            month,
            principal: Decimal::ZERO,
            interest: Decimal::ZERO,
            total: Decimal::ZERO,
        })
        .collect();
    for p in payments.iter().filter(|p| year.contains(p.date)) {
        if let Some(m) = months.get_mut(p.date.month0() as usize) {
            m.principal = add(m.principal, p.principal, "aflossing")?;
            m.interest = add(m.interest, p.interest, "rente")?;
            m.total = add(add(m.total, p.principal, "totaal")?, p.interest, "totaal")?;
        }
    }
    Ok(months)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LenderShare {
    #[serde(rename = "kredietverstrekker")]
    pub lender: String,
    #[serde(rename = "bedrag")]
    pub principal: Decimal,
    #[serde(rename = "aantal")]
    pub loans: usize,
}

/// Borrowed principal per lender, largest first.
pub fn lender_distribution(loans: &[Loan]) -> Result<Vec<LenderShare>> {
    let mut agg: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for loan in loans {
        let entry = agg.entry(loan.lender.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 = add(entry.0, loan.principal, "bedrag")?;
        entry.1 += 1;
    }
    let mut items: Vec<LenderShare> = agg
        .into_iter()
        .map(|(lender, (principal, loans))| LenderShare {
            lender: lender.to_string(),
            principal,
            loans,
        })
        .collect();
    items.sort_by(|a, b| b.principal.cmp(&a.principal).then_with(|| a.lender.cmp(&b.lender)));
    Ok(items)
}

/// Flat totals shown on the dashboard for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub jaar: Year,
    pub totaal_leenbedrag: Decimal,
    pub totaal_aflossing: Decimal,
    pub totaal_rente: Decimal,
    pub aantal_betalingen: usize,
    pub lopende_leningen: usize,
}

pub fn dashboard(year: Year, loans: &[Loan], payments: &[Payment]) -> Result<Dashboard> {
    let in_year: Vec<&Payment> = payments.iter().filter(|p| year.contains(p.date)).collect();
    let mut totaal_leenbedrag = Decimal::ZERO;
    for l in loans {
        totaal_leenbedrag = add(totaal_leenbedrag, l.principal, "totaalLeenbedrag")?;
    }
    let mut totaal_aflossing = Decimal::ZERO;
    let mut totaal_rente = Decimal::ZERO;
    for p in &in_year {
        totaal_aflossing = add(totaal_aflossing, p.principal, "totaalAflossing")?;
        totaal_rente = add(totaal_rente, p.interest, "totaalRente")?;
    }
    Ok(Dashboard {
        jaar: year,
        totaal_leenbedrag,
        totaal_aflossing,
        totaal_rente,
        aantal_betalingen: in_year.len(),
        lopende_leningen: loans
            .iter()
            .filter(|l| l.status == LoanStatus::Active)
            .count(),
    })
}

/// Payments whose installment is not the sum of its principal and interest.
pub fn installment_mismatches(payments: &[Payment]) -> Vec<&Payment> {
    payments.iter().filter(|p| !p.is_balanced()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, RateType};
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn loan(id: &str, lender: &str, principal: Decimal) -> Loan {
        Loan {
            id: id.into(),
            lender: lender.into(),
            loan_type: "Hypotheek".into(),
            start_date: date("2020-01-01"),
            end_date: None,
            principal,
            interest_rate: dec!(3.5),
            rate_type: RateType::Fixed,
            status: LoanStatus::Active,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn payment(id: &str, loan_id: &str, d: &str, principal: Decimal, interest: Decimal) -> Payment {
        Payment {
            id: id.into(),
            loan_id: loan_id.into(),
            date: date(d),
            installment: principal + interest,
            principal,
            interest,
            status: PaymentStatus::Paid,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn sums_payments_per_loan() {
        let loans = vec![loan("L1", "BankA", dec!(1000))];
        let payments = vec![
            payment("P1", "L1", "2024-03-01", dec!(100.00), dec!(20.00)),
            payment("P2", "L1", "2024-06-01", dec!(100.00), dec!(18.00)),
        ];
        let y = Year::new(2024).unwrap();
        let out = compute_yearly_summary(y, &loans, &payments).unwrap();
        assert_eq!(out.len(), 1);
        let l1 = &out["L1"];
        assert_eq!(l1.lender, "BankA");
        assert_eq!(l1.total_principal, dec!(200.00));
        assert_eq!(l1.total_interest, dec!(38.00));
        // same inputs, same answer
        assert_eq!(out, compute_yearly_summary(y, &loans, &payments).unwrap());
    }

    #[test]
    fn loans_without_payments_in_year_are_omitted() {
        let loans = vec![loan("L1", "BankA", dec!(1000)), loan("L2", "BankB", dec!(5))];
        let payments = vec![payment("P1", "L1", "2023-05-01", dec!(10), dec!(1))];
        let out = compute_yearly_summary(Year::new(2024).unwrap(), &loans, &payments).unwrap();
        assert!(out.is_empty());
        assert!(compute_yearly_summary(Year::new(2024).unwrap(), &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn year_boundaries_are_inclusive() {
        let loans = vec![loan("L1", "BankA", dec!(1000))];
        let payments = vec![
            payment("a", "L1", "2023-12-31", dec!(1), dec!(1)),
            payment("b", "L1", "2024-01-01", dec!(10), dec!(2)),
            payment("c", "L1", "2024-12-31", dec!(20), dec!(3)),
            payment("d", "L1", "2025-01-01", dec!(1), dec!(1)),
        ];
        let out = compute_yearly_summary(Year::new(2024).unwrap(), &loans, &payments).unwrap();
        assert_eq!(out["L1"].total_principal, dec!(30));
        assert_eq!(out["L1"].total_interest, dec!(5));
    }

    #[test]
    fn cents_do_not_drift() {
        let loans = vec![loan("L1", "BankA", dec!(1000))];
        let payments: Vec<Payment> = (0..10)
            .map(|i| payment(&format!("P{}", i), "L1", "2024-02-02", dec!(0.10), dec!(0.20)))
            .collect();
        let out = compute_yearly_summary(Year::new(2024).unwrap(), &loans, &payments).unwrap();
        assert_eq!(out["L1"].total_principal, dec!(1.00));
        assert_eq!(out["L1"].total_interest, dec!(2.00));
    }

    #[test]
    fn year_parse_rejects_garbage() {
        assert_eq!(Year::parse("2024").unwrap().value(), 2024);
        assert_eq!(Year::parse(" 1999 ").unwrap().value(), 1999);
        for bad in ["", "abc", "20x4", "-2024", "+2024", "999", "10000", "99999999999"] {
            assert!(
                matches!(Year::parse(bad), Err(Error::Validation(_))),
                "{bad} accepted"
            );
        }
        let r = Year::new(2024).unwrap().range();
        assert_eq!(r.start, date("2024-01-01"));
        assert_eq!(r.end, date("2024-12-31"));
    }

    #[test]
    fn monthly_breakdown_has_twelve_months() {
        let payments = vec![
            payment("P1", "L1", "2024-03-01", dec!(100.00), dec!(20.00)),
            payment("P2", "L2", "2024-03-15", dec!(50.00), dec!(5.00)),
            payment("P3", "L1", "2024-12-31", dec!(1.00), dec!(0.50)),
            payment("P4", "L1", "2025-01-01", dec!(9.00), dec!(9.00)),
        ];
        let months = monthly_breakdown(Year::new(2024).unwrap(), &payments).unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months[2].principal, dec!(150.00));
        assert_eq!(months[2].total, dec!(175.00));
        assert_eq!(months[11].interest, dec!(0.50));
        assert_eq!(months[0].total, Decimal::ZERO);
    }

    #[test]
    fn lender_distribution_groups_and_orders() {
        let loans = vec![
            loan("L1", "BankA", dec!(100)),
            loan("L2", "BankB", dec!(300)),
            loan("L3", "BankA", dec!(250)),
        ];
        let dist = lender_distribution(&loans).unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist[0].lender, "BankA");
        assert_eq!(dist[0].principal, dec!(350));
        assert_eq!(dist[0].loans, 2);
        assert_eq!(dist[1].lender, "BankB");
    }

    #[test]
    fn dashboard_totals_and_mismatches() {
        let mut repaid = loan("L2", "BankB", dec!(500));
        repaid.status = LoanStatus::Repaid;
        let loans = vec![loan("L1", "BankA", dec!(1000)), repaid];
        let mut off = payment("P2", "L1", "2024-04-01", dec!(10), dec!(1));
        off.installment = dec!(12);
        let payments = vec![
            payment("P1", "L1", "2024-03-01", dec!(100), dec!(20)),
            off,
            payment("P3", "L2", "2023-03-01", dec!(7), dec!(7)),
        ];
        let d = dashboard(Year::new(2024).unwrap(), &loans, &payments).unwrap();
        assert_eq!(d.totaal_leenbedrag, dec!(1500));
        assert_eq!(d.totaal_aflossing, dec!(110));
        assert_eq!(d.totaal_rente, dec!(21));
        assert_eq!(d.aantal_betalingen, 2);
        assert_eq!(d.lopende_leningen, 1);

        let bad = installment_mismatches(&payments);
        assert_eq!(bad.len(), 1);
        assert_eq!(bad[0].id, "P2");
    }

    #[test]
    fn overflowing_totals_are_errors() {
        let y = Year::new(2024).unwrap();
        let loans = vec![loan("L1", "BankA", Decimal::MAX), loan("L2", "BankA", Decimal::MAX)];
        let payments = vec![
            payment("P1", "L1", "2024-03-01", Decimal::MAX, Decimal::ZERO),
            payment("P2", "L1", "2024-03-02", Decimal::MAX, Decimal::ZERO),
        ];
        assert!(matches!(
            compute_yearly_summary(y, &loans, &payments),
            Err(Error::Overflow("totaal_aflossing"))
        ));
        assert!(matches!(monthly_breakdown(y, &payments), Err(Error::Overflow(_))));
        assert!(matches!(lender_distribution(&loans), Err(Error::Overflow(_))));
        assert!(matches!(dashboard(y, &loans, &payments), Err(Error::Overflow(_))));
    }
}
